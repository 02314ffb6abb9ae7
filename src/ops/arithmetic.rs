//! Operation selectors shared by kernels, the checked client and the C surface

/// Element-wise unary map: `target[i] = f(mat[i])`
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum UnaryOp {
    /// Natural log: ln(a)
    Log,
    /// Exponential: e^a
    Exp,
    /// Square root: sqrt(a)
    Sqrt,
    /// Reciprocal: 1/a
    Recip,
    /// Logistic: 1 / (1 + e^-a)
    Sigmoid,
    /// Sign: -1, 0 or +1 (`sign(0) == 0`)
    Sign,
    /// Hyperbolic tangent: tanh(a)
    Tanh,
    /// Absolute value: |a|
    Abs,
    /// Softplus: ln(1 + e^a)
    Log1PlusExp,
}

impl UnaryOp {
    /// Apply the operation to one value
    #[inline(always)]
    pub fn apply(self, x: f32) -> f32 {
        match self {
            UnaryOp::Log => x.ln(),
            UnaryOp::Exp => x.exp(),
            UnaryOp::Sqrt => x.sqrt(),
            UnaryOp::Recip => 1.0 / x,
            UnaryOp::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            UnaryOp::Sign => {
                if x > 0.0 {
                    1.0
                } else if x < 0.0 {
                    -1.0
                } else {
                    // also maps NaN to 0
                    0.0
                }
            }
            UnaryOp::Tanh => x.tanh(),
            UnaryOp::Abs => x.abs(),
            UnaryOp::Log1PlusExp => {
                if x > 0.0 {
                    x + (-x).exp().ln_1p()
                } else {
                    x.exp().ln_1p()
                }
            }
        }
    }

    /// Kernel name used in launch logs and the C surface
    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Log => "log",
            UnaryOp::Exp => "exp",
            UnaryOp::Sqrt => "sqrt",
            UnaryOp::Recip => "reciprocal",
            UnaryOp::Sigmoid => "sigmoid",
            UnaryOp::Sign => "sign",
            UnaryOp::Tanh => "tanh",
            UnaryOp::Abs => "abs",
            UnaryOp::Log1PlusExp => "log_1_plus_exp",
        }
    }
}

/// Element-wise binary combination, with a matrix or a scalar right operand
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    /// Addition: a + b
    Add,
    /// Subtraction: a - b
    Sub,
    /// Multiplication: a * b
    Mul,
    /// Division: a / b
    Div,
    /// Power: a^b
    Pow,
    /// Minimum: min(a, b)
    Min,
    /// Maximum: max(a, b)
    Max,
}

impl BinaryOp {
    /// Apply the operation to one pair of values
    #[inline(always)]
    pub fn apply(self, a: f32, b: f32) -> f32 {
        match self {
            BinaryOp::Add => a + b,
            BinaryOp::Sub => a - b,
            BinaryOp::Mul => a * b,
            BinaryOp::Div => a / b,
            BinaryOp::Pow => a.powf(b),
            BinaryOp::Min => {
                if a < b {
                    a
                } else {
                    b
                }
            }
            BinaryOp::Max => {
                if a > b {
                    a
                } else {
                    b
                }
            }
        }
    }

    /// Kernel name used in launch logs
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "subtract",
            BinaryOp::Mul => "mult",
            BinaryOp::Div => "divide",
            BinaryOp::Pow => "pow",
            BinaryOp::Min => "minimum",
            BinaryOp::Max => "maximum",
        }
    }
}

/// Element-wise comparison producing 1.0 (true) or 0.0 (false)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Less than: a < b
    Lt,
    /// Greater than: a > b
    Gt,
    /// Equal: a == b
    Eq,
}

impl CompareOp {
    /// Evaluate the predicate as 1.0 / 0.0
    #[inline(always)]
    pub fn apply(self, a: f32, b: f32) -> f32 {
        let hit = match self {
            CompareOp::Lt => a < b,
            CompareOp::Gt => a > b,
            CompareOp::Eq => a == b,
        };
        if hit { 1.0 } else { 0.0 }
    }

    /// Kernel name used in launch logs
    pub fn name(self) -> &'static str {
        match self {
            CompareOp::Lt => "less_than",
            CompareOp::Gt => "greater_than",
            CompareOp::Eq => "equals",
        }
    }
}

/// Which axis a broadcast vector runs along
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VectorAxis {
    /// Length-`height` vector, indexed by `i % height`
    Column,
    /// Length-`width` vector, indexed by `i / height`
    Row,
}

impl VectorAxis {
    /// Vector index feeding flat matrix index `i` of a column-major matrix
    #[inline(always)]
    pub fn vector_index(self, i: usize, height: usize) -> usize {
        match self {
            VectorAxis::Column => i % height,
            VectorAxis::Row => i / height,
        }
    }

    /// Required vector length for a `height x width` matrix
    #[inline]
    pub fn vector_len(self, height: usize, width: usize) -> usize {
        match self {
            VectorAxis::Column => height,
            VectorAxis::Row => width,
        }
    }
}

/// Matrix-vector broadcast combination
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BroadcastOp {
    /// `mat + vec`
    Add,
    /// `mat * vec`
    Mul,
    /// `mat + mult * vec` (fused scale-and-add)
    AddMult(f32),
}

impl BroadcastOp {
    /// Combine one matrix value with its vector value
    #[inline(always)]
    pub fn apply(self, m: f32, v: f32) -> f32 {
        match self {
            BroadcastOp::Add => m + v,
            BroadcastOp::Mul => m * v,
            BroadcastOp::AddMult(mult) => m + mult * v,
        }
    }

    /// Kernel name used in launch logs
    pub fn name(self, axis: VectorAxis) -> &'static str {
        match (self, axis) {
            (BroadcastOp::Add, VectorAxis::Column) => "add_col_vector",
            (BroadcastOp::Add, VectorAxis::Row) => "add_row_vector",
            (BroadcastOp::Mul, VectorAxis::Column) => "mult_by_col_vector",
            (BroadcastOp::Mul, VectorAxis::Row) => "mult_by_row_vector",
            (BroadcastOp::AddMult(_), VectorAxis::Column) => "add_col_mult",
            (BroadcastOp::AddMult(_), VectorAxis::Row) => "add_row_mult",
        }
    }
}

/// Per-column reduction over all `height` entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnReduceOp {
    /// Largest entry
    Max,
    /// Smallest entry
    Min,
    /// Sum of entries
    Sum,
    /// Row index of the first largest entry, as f32
    Argmax,
}

impl ColumnReduceOp {
    /// Kernel name used in launch logs
    pub fn name(self) -> &'static str {
        match self {
            ColumnReduceOp::Max => "max_columnwise",
            ColumnReduceOp::Min => "min_columnwise",
            ColumnReduceOp::Sum => "sum_columnwise",
            ColumnReduceOp::Argmax => "argmax_columnwise",
        }
    }
}
