pub mod allocator;
pub mod constraint_filter;
pub mod equipment;
pub mod output_formatter;
pub mod progressive_overload;
pub mod rest;
pub mod selection;
pub mod templates;
pub mod workout_engine;
