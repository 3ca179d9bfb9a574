//! Walks a column adapter through a table that shrinks and grows.
//!
//! Run with `RUST_LOG=horizon_axbridge=debug` to see degraded queries logged.

use std::sync::Arc;

use horizon_axbridge::accessibility::{
    AccessibilityBridge, AdapterNode, AdapterTreeDebug, AxAttribute,
};
use horizon_axbridge::model::SimpleAccessibleTable;
use horizon_axbridge::BridgeConfig;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let bridge = AccessibilityBridge::with_config(&BridgeConfig::default())?;
    let context = bridge.context().clone();

    let table = Arc::new(SimpleAccessibleTable::new(
        "Employees",
        ["Name", "Department", "Salary"],
    ));
    table.append_row(["Alice", "Engineering", "100"]);
    table.append_row(["Bob", "Sales", "90"]);
    table.bind_to(&context);

    let column = bridge
        .attach_table(&table)
        .column(1)
        .ok_or("table has no column 1")?;

    println!("{}", AdapterTreeDebug::new(bridge.tree()));
    println!(
        "3 columns: index={:?} header={:?}",
        column.column_number_in_table(),
        column.header_text()
    );

    let shrink = table.clone();
    context.invoke_and_wait(move || shrink.set_column_count(1))?;
    println!(
        "1 column:  index={:?} value={:?}",
        column.column_number_in_table(),
        column.attribute(AxAttribute::ColumnIndex)
    );

    let grow = table.clone();
    context.invoke_and_wait(move || {
        grow.set_column_count(2);
        grow.set_header(1, "Team");
    })?;
    println!(
        "2 columns: index={:?} header={:?}",
        column.column_number_in_table(),
        column.header_text()
    );

    drop(table);
    println!("dropped:   index={:?}", column.column_number_in_table());
    println!("pruned {} adapters", bridge.tree().prune_invalid());

    context.stop_and_join();
    Ok(())
}
