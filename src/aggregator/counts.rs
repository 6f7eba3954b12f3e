//! Fold parsed allocation blocks into keyed count tables.
//!
//! Every report mode shares the same fold: look up the record for the
//! event's key, creating it if absent, then add one occurrence and the
//! event's page count. Only the key projection differs between modes.

use crate::parser::ParsedLog;
use log::debug;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hash;

/// Running totals for one aggregation key
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    /// Number of allocation events folded into this key
    pub count: u64,

    /// Sum of page counts across those events; always >= count
    pub pages: u64,
}

impl Tally {
    pub(crate) fn add(&mut self, pages: u64) {
        self.count += 1;
        self.pages += pages;
    }
}

/// Per-module totals, one row per module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRow {
    pub module: String,
    pub count: u64,
    pub pages: u64,
}

/// Per-(module, order) totals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleOrderRow {
    pub module: String,
    pub order: u32,
    pub count: u64,
    pub pages: u64,
}

/// Per-process totals
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRow {
    pub process: String,
    pub count: u64,
    pub pages: u64,
}

/// Page totals per allocation order, plus the grand total
///
/// Keyed by order in a BTreeMap so iteration is already ascending.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderTotals {
    pub per_order: BTreeMap<u32, Tally>,
    pub total: Tally,
}

/// The shared fold; key projection is the caller's
fn fold<K: Eq + Hash>(items: impl Iterator<Item = (K, u64)>) -> HashMap<K, Tally> {
    let mut table: HashMap<K, Tally> = HashMap::new();
    for (key, pages) in items {
        table.entry(key).or_default().add(pages);
    }
    table
}

/// Group module-attributed blocks by module.
///
/// Blocks without a module are skipped. Row order is unspecified here;
/// the report layer sorts.
pub fn aggregate_by_module(log: &ParsedLog) -> Vec<ModuleRow> {
    let table = fold(log.blocks.iter().filter_map(|b| {
        b.module.as_deref().map(|m| (m.to_string(), b.page_count))
    }));

    debug!("aggregated {} modules", table.len());

    table
        .into_iter()
        .map(|(module, tally)| ModuleRow {
            module,
            count: tally.count,
            pages: tally.pages,
        })
        .collect()
}

/// Group module-attributed blocks by (module, order).
pub fn aggregate_by_module_order(log: &ParsedLog) -> Vec<ModuleOrderRow> {
    let table = fold(log.blocks.iter().filter_map(|b| {
        b.module
            .as_deref()
            .map(|m| ((m.to_string(), b.order), b.page_count))
    }));

    table
        .into_iter()
        .map(|((module, order), tally)| ModuleOrderRow {
            module,
            order,
            count: tally.count,
            pages: tally.pages,
        })
        .collect()
}

/// Group every block by allocating process name.
///
/// Blocks from dumps without extended headers fold under `Unknown`;
/// callers should not reach here unless the dump carried at least one
/// process header.
pub fn aggregate_by_process(log: &ParsedLog) -> Vec<ProcessRow> {
    let table = fold(log.blocks.iter().map(|b| {
        let name = b
            .process
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| "Unknown".to_string());
        (name, b.page_count)
    }));

    table
        .into_iter()
        .map(|(process, tally)| ProcessRow {
            process,
            count: tally.count,
            pages: tally.pages,
        })
        .collect()
}

/// Fold a list of orders into per-order page totals and a grand total.
pub fn fold_orders(orders: &[u32]) -> OrderTotals {
    let mut totals = OrderTotals::default();

    for &order in orders {
        let Some(pages) = 1u64.checked_shl(order) else {
            continue;
        };
        totals.per_order.entry(order).or_default().add(pages);
        totals.total.add(pages);
    }

    totals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_blocks;
    use std::io::Cursor;

    fn scan(input: &str) -> ParsedLog {
        parse_blocks(Cursor::new(input)).unwrap()
    }

    const TWO_VMXNET3_BLOCKS: &str = "Page allocated via order 0, mask 0x2dc2\n\
         stack_line\n\
         consumed_by [vmxnet3]\n\
         \n\
         Page allocated via order 0, mask 0x2dc2\n\
         stack_line\n\
         consumed_by [vmxnet3]\n\
         \n";

    #[test]
    fn test_same_module_folds_into_one_row() {
        let rows = aggregate_by_module(&scan(TWO_VMXNET3_BLOCKS));

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].module, "vmxnet3");
        assert_eq!(rows[0].count, 2);
        assert_eq!(rows[0].pages, 2);
    }

    #[test]
    fn test_block_without_module_is_not_counted() {
        let log = scan(
            "Page allocated via order 5, mask 0x2dc2\n\
             stack_line_without_attribution\n\
             \n",
        );

        assert!(aggregate_by_module(&log).is_empty());
        assert!(aggregate_by_module_order(&log).is_empty());
    }

    #[test]
    fn test_event_contributes_exactly_two_pow_order() {
        let log = scan(
            "Page allocated via order 4, mask 0x2dc2\n\
             consumed_by [xfs]\n\
             \n",
        );

        let rows = aggregate_by_module(&log);
        assert_eq!(rows[0].count, 1);
        assert_eq!(rows[0].pages, 16);
    }

    #[test]
    fn test_module_order_keys_are_distinct() {
        let log = scan(
            "Page allocated via order 0, mask 0x2dc2\n\
             consumed_by [xfs]\n\
             \n\
             Page allocated via order 2, mask 0x2dc2\n\
             consumed_by [xfs]\n\
             \n",
        );

        assert_eq!(aggregate_by_module(&log).len(), 1);
        assert_eq!(aggregate_by_module_order(&log).len(), 2);
    }

    #[test]
    fn test_duplicated_input_doubles_every_tally() {
        let doubled = format!("{TWO_VMXNET3_BLOCKS}{TWO_VMXNET3_BLOCKS}");
        let rows = aggregate_by_module(&scan(TWO_VMXNET3_BLOCKS));
        let doubled_rows = aggregate_by_module(&scan(&doubled));

        assert_eq!(doubled_rows[0].count, rows[0].count * 2);
        assert_eq!(doubled_rows[0].pages, rows[0].pages * 2);
    }

    #[test]
    fn test_aggregate_by_process() {
        let log = scan(
            "Page allocated via order 1, mask 0x2dc2, pid 10, tgid 10 (systemd), ts 1 ns\n\
             frame\n\
             \n\
             Page allocated via order 0, mask 0x2dc2, pid 20, tgid 20 (sshd), ts 2 ns\n\
             frame\n\
             \n\
             Page allocated via order 0, mask 0x2dc2, pid 11, tgid 10 (systemd), ts 3 ns\n\
             frame\n\
             \n",
        );

        let mut rows = aggregate_by_process(&log);
        rows.sort_by(|a, b| a.process.cmp(&b.process));

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].process, "sshd");
        assert_eq!(rows[0].pages, 1);
        assert_eq!(rows[1].process, "systemd");
        assert_eq!(rows[1].count, 2);
        assert_eq!(rows[1].pages, 3);
    }

    #[test]
    fn test_blocks_without_header_fold_under_unknown() {
        let log = scan(
            "Page allocated via order 0, mask 0x2dc2, pid 10, tgid 10 (systemd), ts 1 ns\n\
             frame\n\
             \n\
             Page allocated via order 0, mask 0x2dc2\n\
             frame\n\
             \n",
        );

        let rows = aggregate_by_process(&log);
        assert!(rows.iter().any(|r| r.process == "Unknown"));
    }

    #[test]
    fn test_fold_orders() {
        let totals = fold_orders(&[0, 0, 2]);

        assert_eq!(totals.per_order.len(), 2);
        assert_eq!(totals.per_order[&0].count, 2);
        assert_eq!(totals.per_order[&0].pages, 2);
        assert_eq!(totals.per_order[&2].pages, 4);
        assert_eq!(totals.total.count, 3);
        assert_eq!(totals.total.pages, 6);
    }

    #[test]
    fn test_fold_orders_empty() {
        let totals = fold_orders(&[]);
        assert!(totals.per_order.is_empty());
        assert_eq!(totals.total.pages, 0);
    }

    #[test]
    fn test_pages_never_below_count() {
        let rows = aggregate_by_module(&scan(TWO_VMXNET3_BLOCKS));
        for row in rows {
            assert!(row.pages >= row.count);
        }
    }
}
