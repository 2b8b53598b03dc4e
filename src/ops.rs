pub mod group_by;
pub use group_by::{GroupByOp, GroupByUntilOp, GroupObservable};
