//! Pivot/shift statements for subexpressions.
//!
//! A subexpression combines several data items in one arithmetic template,
//! e.g. `deA*(deoA+deoB)`, evaluated per period and org unit before the
//! query's aggregation is applied. The generated statement has two levels:
//!
//! - The inner query pivots analytics rows into one column per item with
//!   `sum(case when ax."dx" = '<uid>' ... then ax."value" else null end)`.
//! - The outer query evaluates the template over those columns, aggregates
//!   it, and drops rows where it is null.
//!
//! Items with a period offset read the value of another period. The inner
//! query then joins a `values` table of `(delta, reportperiod, dataperiod)`
//! rows, so one stored row is read both as "current" and as "N periods
//! ago". The org unit column is left out of the outer query in that case.
//!
//! Template placeholders are substituted as whole identifiers; the template
//! itself is not validated.

use std::collections::{BTreeSet, HashMap};
use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use super::dialect::{Dialect, SqlDialect};
use super::escape::quote_list;
use super::{RenderError, RenderResult, ANALYTICS_TBL_ALIAS};
use crate::model::{AggregationType, DimensionalItem, Period};
use crate::query::{AnalyticsQuery, DATA_X_DIM_ID, ORGUNIT_DIM_ID, PERIOD_DIM_ID};

/// Alias of the period shift table.
const SHIFT_TBL_ALIAS: &str = "shift";

/// Name of the computed value column.
const VALUE_COLUMN: &str = "value";

const DEFAULT_TABLE: &str = "analytics";

static IDENTIFIER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[A-Za-z_][A-Za-z0-9_]*\b").expect("valid identifier pattern"));

/// A template placeholder and the item it stands for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubexpressionItem {
    pub placeholder: String,
    pub item: DimensionalItem,
}

/// A subexpression template with its items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subexpression {
    uid: String,
    template: String,
    items: Vec<SubexpressionItem>,
}

impl Subexpression {
    pub fn new(uid: &str, template: &str) -> Self {
        Self {
            uid: uid.into(),
            template: template.into(),
            items: Vec::new(),
        }
    }

    pub fn with_item(mut self, placeholder: &str, item: DimensionalItem) -> Self {
        self.items.push(SubexpressionItem {
            placeholder: placeholder.into(),
            item,
        });
        self
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn items(&self) -> &[SubexpressionItem] {
        &self.items
    }

    fn has_period_offsets(&self) -> bool {
        self.items.iter().any(|i| i.item.period_offset() != 0)
    }
}

/// Column alias of an item in the pivot query.
///
/// `<uid>[_<coc>][_<aoc>]`, keeping an empty `coc` slot when only an `aoc`
/// is set, then `_agg_<type>` for an aggregation override and
/// `_minus_<n>` / `_plus_<n>` for a period offset.
pub fn column_alias(item: &DimensionalItem) -> String {
    let mut alias = item.uid().to_string();

    match (item.category_option_combo(), item.attribute_option_combo()) {
        (Some(coc), Some(aoc)) => {
            alias.push('_');
            alias.push_str(&coc.uid);
            alias.push('_');
            alias.push_str(&aoc.uid);
        }
        (Some(coc), None) => {
            alias.push('_');
            alias.push_str(&coc.uid);
        }
        (None, Some(aoc)) => {
            alias.push_str("__");
            alias.push_str(&aoc.uid);
        }
        (None, None) => {}
    }

    if let Some(aggregation_type) = item.aggregation_override() {
        alias.push_str("_agg_");
        alias.push_str(aggregation_type.as_str());
    }

    match item.period_offset() {
        0 => {}
        n if n < 0 => alias.push_str(&format!("_minus_{}", n.unsigned_abs())),
        n => alias.push_str(&format!("_plus_{}", n)),
    }

    alias
}

/// Renders subexpression statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubexpressionSqlGenerator {
    dialect: Dialect,
}

impl SubexpressionSqlGenerator {
    pub fn new(dialect: Dialect) -> Self {
        Self { dialect }
    }

    fn column(&self, table_alias: &str, column: &str) -> String {
        format!("{}.{}", table_alias, self.dialect.quote_identifier(column))
    }

    /// The statement computing `subexpression` for the periods, org units
    /// and filters of `query`.
    pub fn get_sql(&self, subexpression: &Subexpression, query: &AnalyticsQuery) -> RenderResult<String> {
        if subexpression.items().is_empty() {
            return Err(RenderError::EmptySubexpression(subexpression.uid().to_string()));
        }

        let period_column = query.period_column();
        let org_unit_column = query.org_unit_column();
        let shifted = subexpression.has_period_offsets();

        let inner = self.pivot_query(subexpression, query, &period_column, &org_unit_column)?;
        let expression = self.substitute(subexpression);

        let mut group_by = vec![self.column(ANALYTICS_TBL_ALIAS, &period_column)];
        if !shifted {
            group_by.push(self.column(ANALYTICS_TBL_ALIAS, &org_unit_column));
        }
        let group_by = group_by.join(",");

        let aggregation = query
            .aggregation_type()
            .unwrap_or(AggregationType::Sum)
            .sql_function();

        let sql = format!(
            "select {group_by},{aggregation}({expression}) as {value} from ({inner}) as {ax} \
             where ({expression}) is not null group by {group_by}",
            value = self.dialect.quote_identifier(VALUE_COLUMN),
            ax = ANALYTICS_TBL_ALIAS,
        );

        debug!(subexpression = subexpression.uid(), shifted, "Rendered subexpression");
        Ok(sql)
    }

    /// Replace each placeholder in the template with its quoted alias.
    pub fn substitute(&self, subexpression: &Subexpression) -> String {
        let aliases: HashMap<&str, String> = subexpression
            .items()
            .iter()
            .map(|i| (i.placeholder.as_str(), column_alias(&i.item)))
            .collect();

        IDENTIFIER
            .replace_all(subexpression.template(), |caps: &Captures| {
                let token = &caps[0];
                match aliases.get(token) {
                    Some(alias) => self.dialect.quote_identifier(alias),
                    None => token.to_string(),
                }
            })
            .into_owned()
    }

    fn pivot_query(
        &self,
        subexpression: &Subexpression,
        query: &AnalyticsQuery,
        period_column: &str,
        org_unit_column: &str,
    ) -> RenderResult<String> {
        let ax_period = self.column(ANALYTICS_TBL_ALIAS, period_column);
        let ax_org_unit = self.column(ANALYTICS_TBL_ALIAS, org_unit_column);
        let shift = if subexpression.has_period_offsets() {
            Some(self.shift_table(subexpression, query)?)
        } else {
            None
        };

        let mut select = Vec::new();
        let group_period = match &shift {
            Some(_) => {
                let report_period = self.column(SHIFT_TBL_ALIAS, "reportperiod");
                select.push(format!(
                    "{} as {}",
                    report_period,
                    self.dialect.quote_identifier(period_column)
                ));
                report_period
            }
            None => {
                select.push(ax_period.clone());
                ax_period.clone()
            }
        };
        select.push(ax_org_unit.clone());
        select.extend(
            subexpression
                .items()
                .iter()
                .map(|i| self.pivot_column(&i.item, shift.is_some())),
        );

        let mut from = format!(
            "{} as {}",
            self.dialect
                .quote_identifier(query.table_name().unwrap_or(DEFAULT_TABLE)),
            ANALYTICS_TBL_ALIAS
        );
        let data_periods = match &shift {
            Some(table) => {
                from.push_str(&format!(
                    " join {} on {} = {}",
                    table.sql,
                    self.column(SHIFT_TBL_ALIAS, "dataperiod"),
                    ax_period
                ));
                table.data_periods.clone()
            }
            None => query.all_periods().into_iter().map(Period::iso).collect(),
        };

        let mut conditions = vec![format!(
            "{} in {}",
            self.column(ANALYTICS_TBL_ALIAS, DATA_X_DIM_ID),
            quote_list(entity_uids(subexpression).iter().map(String::as_str))
        )];
        if !data_periods.is_empty() {
            conditions.push(format!(
                "{} in {}",
                ax_period,
                quote_list(data_periods.iter().map(String::as_str))
            ));
        }
        let org_units: Vec<&str> = query
            .org_units()
            .into_iter()
            .chain(query.filter_org_units())
            .map(|ou| ou.uid())
            .collect();
        if !org_units.is_empty() {
            conditions.push(format!("{} in {}", ax_org_unit, quote_list(org_units)));
        }
        for filter in query.filters() {
            let key = filter.key.as_str();
            if [DATA_X_DIM_ID, PERIOD_DIM_ID, ORGUNIT_DIM_ID].contains(&key) || filter.is_empty() {
                continue;
            }
            let uids = filter.item_uids();
            conditions.push(format!(
                "{} in {}",
                self.column(ANALYTICS_TBL_ALIAS, key),
                quote_list(uids.iter().map(String::as_str))
            ));
        }

        Ok(format!(
            "select {} from {} where {} group by {},{}",
            select.join(","),
            from,
            conditions.join(" and "),
            group_period,
            ax_org_unit
        ))
    }

    /// `<fn>(case when ... then ax."value"::numeric else null end) as "<alias>"`.
    fn pivot_column(&self, item: &DimensionalItem, shifted: bool) -> String {
        let dialect = self.dialect;
        let mut conditions = Vec::new();
        if shifted {
            conditions.push(format!(
                "{} = {}",
                self.column(SHIFT_TBL_ALIAS, "delta"),
                item.period_offset()
            ));
        }
        conditions.push(format!(
            "{} = {}",
            self.column(ANALYTICS_TBL_ALIAS, DATA_X_DIM_ID),
            dialect.quote_string(item.uid())
        ));
        if let Some(coc) = item.category_option_combo() {
            conditions.push(format!(
                "{} = {}",
                self.column(ANALYTICS_TBL_ALIAS, "co"),
                dialect.quote_string(&coc.uid)
            ));
        }
        if let Some(aoc) = item.attribute_option_combo() {
            conditions.push(format!(
                "{} = {}",
                self.column(ANALYTICS_TBL_ALIAS, "ao"),
                dialect.quote_string(&aoc.uid)
            ));
        }

        format!(
            "{}(case when {} then {} else null end) as {}",
            item.effective_aggregation_type().sql_function(),
            conditions.join(" and "),
            dialect.numeric_cast(&self.column(ANALYTICS_TBL_ALIAS, VALUE_COLUMN)),
            dialect.quote_identifier(&column_alias(item))
        )
    }

    /// The `values` table mapping each (offset, requested period) to the
    /// period holding the data.
    fn shift_table(&self, subexpression: &Subexpression, query: &AnalyticsQuery) -> RenderResult<ShiftTable> {
        let mut offsets: BTreeSet<i32> = subexpression
            .items()
            .iter()
            .map(|i| i.item.period_offset())
            .collect();
        offsets.insert(0);

        let periods: BTreeSet<&Period> = query.all_periods().into_iter().collect();
        if periods.is_empty() {
            return Err(RenderError::MissingPeriods(subexpression.uid().to_string()));
        }

        let mut rows = Vec::new();
        let mut data_periods = BTreeSet::new();
        for &offset in &offsets {
            for period in &periods {
                let data_period = period.shift(offset)?;
                rows.push(format!(
                    "({},{},{})",
                    offset,
                    self.dialect.quote_string(&period.iso()),
                    self.dialect.quote_string(&data_period.iso())
                ));
                data_periods.insert(data_period);
            }
        }

        let columns = ["delta", "reportperiod", "dataperiod"]
            .map(|c| self.dialect.quote_identifier(c))
            .join(",");

        Ok(ShiftTable {
            sql: format!(
                "(values {}) as {} ({})",
                rows.join(","),
                SHIFT_TBL_ALIAS,
                columns
            ),
            data_periods: data_periods.iter().map(Period::iso).collect(),
        })
    }
}

struct ShiftTable {
    sql: String,
    data_periods: Vec<String>,
}

/// Distinct entity UIDs of the items, in item order.
fn entity_uids(subexpression: &Subexpression) -> Vec<String> {
    let mut seen = BTreeSet::new();
    subexpression
        .items()
        .iter()
        .map(|i| i.item.uid().to_string())
        .filter(|uid| seen.insert(uid.clone()))
        .collect()
}
