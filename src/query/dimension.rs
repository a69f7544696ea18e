//! Dimensions and dimension items of a query.

use serde::{Deserialize, Serialize};

use crate::model::{BaseObject, DimensionType, DimensionalItem, OrgUnit, Period};

/// Key of the data dimension.
pub const DATA_X_DIM_ID: &str = "dx";
/// Key of the period dimension.
pub const PERIOD_DIM_ID: &str = "pe";
/// Key of the organisation unit dimension.
pub const ORGUNIT_DIM_ID: &str = "ou";

/// A single item of a dimension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DimensionItem {
    Data(DimensionalItem),
    Period(Period),
    OrgUnit(OrgUnit),
    /// A category option, group, or other plain metadata object.
    Option(BaseObject),
}

impl DimensionItem {
    pub fn uid(&self) -> String {
        match self {
            DimensionItem::Data(item) => item.dimension_item(),
            DimensionItem::Period(period) => period.iso(),
            DimensionItem::OrgUnit(ou) => ou.uid().to_string(),
            DimensionItem::Option(object) => object.uid.clone(),
        }
    }

    pub fn as_period(&self) -> Option<&Period> {
        match self {
            DimensionItem::Period(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_org_unit(&self) -> Option<&OrgUnit> {
        match self {
            DimensionItem::OrgUnit(ou) => Some(ou),
            _ => None,
        }
    }

    pub fn as_data(&self) -> Option<&DimensionalItem> {
        match self {
            DimensionItem::Data(item) => Some(item),
            _ => None,
        }
    }
}

/// A named axis of analysis with its selected items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dimension {
    pub key: String,
    pub dimension_type: DimensionType,
    #[serde(default)]
    pub items: Vec<DimensionItem>,
}

impl Dimension {
    pub fn new(key: &str, dimension_type: DimensionType, items: Vec<DimensionItem>) -> Self {
        Self {
            key: key.into(),
            dimension_type,
            items,
        }
    }

    pub fn data(items: Vec<DimensionalItem>) -> Self {
        Self::new(
            DATA_X_DIM_ID,
            DimensionType::DataX,
            items.into_iter().map(DimensionItem::Data).collect(),
        )
    }

    pub fn periods(periods: Vec<Period>) -> Self {
        Self::new(
            PERIOD_DIM_ID,
            DimensionType::Period,
            periods.into_iter().map(DimensionItem::Period).collect(),
        )
    }

    pub fn org_units(org_units: Vec<OrgUnit>) -> Self {
        Self::new(
            ORGUNIT_DIM_ID,
            DimensionType::OrganisationUnit,
            org_units.into_iter().map(DimensionItem::OrgUnit).collect(),
        )
    }

    /// A copy of this dimension with other items.
    pub fn with_items(&self, items: Vec<DimensionItem>) -> Self {
        Self {
            key: self.key.clone(),
            dimension_type: self.dimension_type,
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item_uids(&self) -> Vec<String> {
        self.items.iter().map(DimensionItem::uid).collect()
    }

    pub fn period_items(&self) -> impl Iterator<Item = &Period> {
        self.items.iter().filter_map(DimensionItem::as_period)
    }

    pub fn org_unit_items(&self) -> impl Iterator<Item = &OrgUnit> {
        self.items.iter().filter_map(DimensionItem::as_org_unit)
    }

    pub fn data_items(&self) -> impl Iterator<Item = &DimensionalItem> {
        self.items.iter().filter_map(DimensionItem::as_data)
    }
}
