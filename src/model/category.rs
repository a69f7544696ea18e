//! Category combos and their option combos.
//!
//! A data value is disaggregated by a category option combo, the
//! combination of one option of every category in the data element's
//! category combo. Operands name a combo directly; requests that name the
//! options instead resolve the combo here.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::identifiable::BaseObject;

/// Errors raised while resolving categories.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CategoryError {
    #[error(
        "Category option combo could not be resolved from category combo '{combo}' and options [{}]",
        .options.join(", ")
    )]
    UnresolvableOptionCombo { combo: String, options: Vec<String> },
}

pub type CategoryResult<T> = Result<T, CategoryError>;

/// One combination of category options.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryOptionCombo {
    #[serde(flatten)]
    pub base: BaseObject,
    /// UIDs of the category options, one per category.
    #[serde(default)]
    pub category_options: BTreeSet<String>,
}

impl CategoryOptionCombo {
    pub fn new<'a>(uid: &str, name: &str, options: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            base: BaseObject::new(uid, name),
            category_options: options.into_iter().map(str::to_string).collect(),
        }
    }

    pub fn uid(&self) -> &str {
        &self.base.uid
    }
}

/// The categories disaggregating a data element, with every option combo.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryCombo {
    #[serde(flatten)]
    pub base: BaseObject,
    #[serde(default)]
    pub option_combos: Vec<CategoryOptionCombo>,
}

impl CategoryCombo {
    pub fn new(uid: &str, name: &str) -> Self {
        Self {
            base: BaseObject::new(uid, name),
            option_combos: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_option_combo(mut self, option_combo: CategoryOptionCombo) -> Self {
        self.option_combos.push(option_combo);
        self
    }

    pub fn uid(&self) -> &str {
        &self.base.uid
    }

    /// The option combo made of exactly the given options, in any order.
    pub fn option_combo(&self, options: &[&str]) -> CategoryResult<&CategoryOptionCombo> {
        let wanted: BTreeSet<&str> = options.iter().copied().collect();
        self.option_combos
            .iter()
            .find(|coc| {
                coc.category_options.len() == wanted.len()
                    && coc.category_options.iter().all(|o| wanted.contains(o.as_str()))
            })
            .ok_or_else(|| CategoryError::UnresolvableOptionCombo {
                combo: self.uid().to_string(),
                options: wanted.into_iter().map(str::to_string).collect(),
            })
    }
}
