//! Bind-parameter collection.
//!
//! Produces the parameters a query binds, in the same order the SQL assembler
//! numbers its placeholders: join conditions, then the filter tree, then the
//! having clause. The result is recomputed on every execution and its length
//! is what validates a cached template.

use super::{BindParam, Criteria, Criterion};
use crate::map::DatabaseMap;

/// Walks a [`Criteria`] and collects its bind parameters.
pub struct ParamCollector<'a> {
    db_map: &'a DatabaseMap,
}

impl<'a> ParamCollector<'a> {
    pub fn new(db_map: &'a DatabaseMap) -> Self {
        Self { db_map }
    }

    /// Mark text comparisons case-insensitive where the query or the node asks
    /// for it, then collect the parameters.
    ///
    /// Calling this twice on an unchanged query yields identical output.
    pub fn collect(&self, criteria: &mut Criteria) -> Vec<BindParam> {
        self.apply_case_folding(criteria);
        Self::params(criteria)
    }

    /// Flag every filter node on a text column as ignore-case when either the
    /// query or the node already requests case-insensitive comparison.
    pub fn apply_case_folding(&self, criteria: &mut Criteria) {
        let query_ignores_case = criteria.ignore_case;
        let aliases = &criteria.aliases;
        let db_map = self.db_map;

        for filter in &mut criteria.filters {
            filter.for_each_attached_mut(&mut |node: &mut Criterion| {
                if !(query_ignores_case || node.is_ignore_case()) {
                    return;
                }
                let table = aliases
                    .get(node.table())
                    .map(String::as_str)
                    .unwrap_or(node.table());
                if db_map.is_text_column(table, node.column()) {
                    node.set_ignore_case(true);
                }
            });
        }
    }

    /// Collect parameters without touching case folding.
    pub fn params(criteria: &Criteria) -> Vec<BindParam> {
        let mut params = Vec::new();

        for join in &criteria.joins {
            params.extend(join.conditions().iter().map(|c| c.to_param()));
        }

        // Only the parameters are needed, the rendered SQL is thrown away
        let mut scratch = String::new();
        for filter in &criteria.filters {
            filter.append_ps_to(&mut scratch, &mut params);
        }

        if let Some(having) = &criteria.having {
            having.append_ps_to(&mut scratch, &mut params);
        }

        params
    }
}
