pub mod pixel;
pub mod row;
