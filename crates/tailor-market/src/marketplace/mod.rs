pub mod tailors;
