pub mod controls;
pub mod debug;
pub mod detail;
pub mod dropdown;
pub mod frequency_chart;
pub mod records;
pub mod text_input;
