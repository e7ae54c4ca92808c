// ── Table and action generation ──

mod actions;
mod columns;
mod format;

pub use actions::{
    ActionDescriptor, ActionItem, ActionMenu, Availability, Handler, Predicate, generate_action_items,
};
pub use columns::{
    Column, ColumnOptions, CompareFn, FieldDescriptor, FieldType, RenderFn, SorterSpec, compare_values,
    generate_columns, render_rows,
};
pub use format::{INVALID_DATE, NOT_AVAILABLE, display_value, format_date, is_blank};
