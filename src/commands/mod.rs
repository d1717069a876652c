pub mod prorate;
