pub mod financial_tools;
pub mod tool;
