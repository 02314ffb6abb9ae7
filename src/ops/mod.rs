//! Operation selectors
//!
//! Small `Copy` enums naming which element-wise, broadcast or reduction
//! variant a kernel runs. Each carries its scalar definition (`apply`) so the
//! raw kernels, the checked client and the tests share one formula.

mod arithmetic;

pub use arithmetic::{BinaryOp, BroadcastOp, ColumnReduceOp, CompareOp, UnaryOp, VectorAxis};
