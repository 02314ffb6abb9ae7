//! Launch geometry and lane/block dispatch
//!
//! Kernels are written against a CUDA-style launch: a grid of blocks, each
//! block a fixed number of threads ("lanes"). On the host every lane is a
//! closure invocation. Blocks are the unit of parallel work; the threads of a
//! block run on the same worker, which lets cooperative kernels express a
//! group barrier as the boundary between two sequential phases.
//!
//! # Index conventions
//!
//! - Lane id: `block_linear * threads_per_block + thread_linear`
//! - `block_linear = x + y * grid.x + z * grid.x * grid.y` (same for threads)

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Threads per block for element-wise kernels
pub const BLOCK_SIZE: u32 = 256;

/// Upper bound on blocks for grid-stride kernels; larger inputs loop
pub const MAX_GRID_BLOCKS: u32 = 4096;

/// Side of the square staging tile used by the transpose kernel
pub const COPY_BLOCK_SIZE: u32 = 16;

/// Cooperating lanes per column in columnwise reductions
pub const REDUCE_GROUP_SIZE: u32 = 32;

/// Rows per block (and columns per block) for row-slice copies
pub const ROW_SLICE_TILE: u32 = 32;

/// Threads per block along each axis of the sparse product grid
pub const SPARSE_TILE: u32 = 16;

/// Upper bound on blocks along each axis of the sparse product grid
pub const MAX_SPARSE_GRID: u32 = 1024;

/// Three-component extent, as used for grid and block dimensions
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Dim3 {
    /// Extent along x
    pub x: u32,
    /// Extent along y
    pub y: u32,
    /// Extent along z
    pub z: u32,
}

impl Dim3 {
    /// A `(x, y, z)` extent
    pub const fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }

    /// A one-dimensional extent
    pub const fn linear(x: u32) -> Self {
        Self { x, y: 1, z: 1 }
    }

    /// A two-dimensional extent
    pub const fn planar(x: u32, y: u32) -> Self {
        Self { x, y, z: 1 }
    }

    /// Number of points covered by this extent
    #[inline]
    pub fn volume(&self) -> usize {
        self.x as usize * self.y as usize * self.z as usize
    }

    /// Split a linear index back into `(x, y, z)` coordinates
    #[inline]
    pub fn unflatten(&self, linear: usize) -> (u32, u32, u32) {
        let x = self.x as usize;
        let xy = x * self.y as usize;
        (
            (linear % x) as u32,
            ((linear % xy) / x) as u32,
            (linear / xy) as u32,
        )
    }
}

impl From<(u32, u32, u32)> for Dim3 {
    fn from((x, y, z): (u32, u32, u32)) -> Self {
        Self { x, y, z }
    }
}

/// Launch geometry for one kernel invocation
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LaunchConfig {
    /// Number of blocks along each axis
    pub grid_dim: Dim3,
    /// Number of threads per block along each axis
    pub block_dim: Dim3,
    /// Minimum number of blocks handed to one rayon task
    pub min_blocks_per_task: usize,
}

impl LaunchConfig {
    /// Create a launch configuration from grid and block extents
    pub fn new(grid_dim: impl Into<Dim3>, block_dim: impl Into<Dim3>) -> Self {
        Self {
            grid_dim: grid_dim.into(),
            block_dim: block_dim.into(),
            min_blocks_per_task: 1,
        }
    }

    /// A 1-D launch with exactly `num_lanes` lanes in a single block
    ///
    /// Handy for pinning the lane geometry in reproducibility tests.
    pub fn lanes(num_lanes: u32) -> Self {
        Self::new(Dim3::linear(1), Dim3::linear(num_lanes))
    }

    /// Set the minimum number of blocks per parallel task
    pub fn with_min_blocks_per_task(mut self, min_blocks: usize) -> Self {
        self.min_blocks_per_task = min_blocks.max(1);
        self
    }

    /// Number of blocks in the grid
    #[inline]
    pub fn num_blocks(&self) -> usize {
        self.grid_dim.volume()
    }

    /// Number of threads in each block
    #[inline]
    pub fn threads_per_block(&self) -> usize {
        self.block_dim.volume()
    }

    /// Total number of lanes in the launch
    #[inline]
    pub fn num_lanes(&self) -> usize {
        self.num_blocks() * self.threads_per_block()
    }

    /// Whether the launch has at least one lane
    #[inline]
    pub fn is_runnable(&self) -> bool {
        self.num_lanes() > 0
    }
}

#[inline]
fn ceil_div(n: usize, d: u32) -> u32 {
    n.div_ceil(d as usize) as u32
}

/// Grid for element-wise operations over `numel` elements.
///
/// Uses a 1D grid with blocks of `BLOCK_SIZE` threads each, capped at
/// `MAX_GRID_BLOCKS`; kernels stride over whatever the grid does not cover.
#[inline]
pub fn elementwise_launch_config(numel: usize) -> LaunchConfig {
    let grid = ceil_div(numel, BLOCK_SIZE).clamp(1, MAX_GRID_BLOCKS);
    LaunchConfig::new(Dim3::linear(grid), Dim3::linear(BLOCK_SIZE))
}

/// Tiled transpose of a `height x width` column-major matrix.
///
/// One `COPY_BLOCK_SIZE x COPY_BLOCK_SIZE` block per tile; `x` walks rows.
#[inline]
pub fn transpose_launch_config(height: usize, width: usize) -> LaunchConfig {
    LaunchConfig::new(
        Dim3::planar(
            ceil_div(height, COPY_BLOCK_SIZE).max(1),
            ceil_div(width, COPY_BLOCK_SIZE).max(1),
        ),
        Dim3::planar(COPY_BLOCK_SIZE, COPY_BLOCK_SIZE),
    )
}

/// Row-slice copy of `rows` rows across `width` columns.
///
/// One 32-lane block per 32-row chunk (x) per 32-column tile (y).
#[inline]
pub fn row_slice_launch_config(rows: usize, width: usize) -> LaunchConfig {
    LaunchConfig::new(
        Dim3::planar(
            ceil_div(rows, ROW_SLICE_TILE).max(1),
            ceil_div(width, ROW_SLICE_TILE).max(1),
        ),
        Dim3::linear(ROW_SLICE_TILE),
    )
}

/// Columnwise reduction: one group of `REDUCE_GROUP_SIZE` lanes per column
#[inline]
pub fn columnwise_launch_config(width: usize) -> LaunchConfig {
    LaunchConfig::new(
        Dim3::linear(width.max(1) as u32),
        Dim3::linear(REDUCE_GROUP_SIZE),
    )
}

/// One lane per row (rows beyond the grid are picked up by striding)
#[inline]
pub fn rows_launch_config(rows: usize) -> LaunchConfig {
    elementwise_launch_config(rows)
}

/// Sparse-dense products: lanes over (sparse row, dense column) pairs.
///
/// Both axes are capped at `MAX_SPARSE_GRID` blocks; kernels wrap around.
#[inline]
pub fn sparse_dot_launch_config(rows: usize, cols: usize) -> LaunchConfig {
    LaunchConfig::new(
        Dim3::planar(
            ceil_div(rows, SPARSE_TILE).clamp(1, MAX_SPARSE_GRID),
            ceil_div(cols, SPARSE_TILE).clamp(1, MAX_SPARSE_GRID),
        ),
        Dim3::planar(SPARSE_TILE, SPARSE_TILE),
    )
}

/// Position of one thread inside a launch
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ThreadIdx {
    /// Block coordinates (`blockIdx`)
    pub block: (u32, u32, u32),
    /// Thread coordinates within the block (`threadIdx`)
    pub thread: (u32, u32, u32),
}

impl ThreadIdx {
    /// Global x coordinate: `block.x * block_dim.x + thread.x`
    #[inline]
    pub fn global_x(&self, block_dim: &Dim3) -> usize {
        self.block.0 as usize * block_dim.x as usize + self.thread.0 as usize
    }

    /// Global y coordinate: `block.y * block_dim.y + thread.y`
    #[inline]
    pub fn global_y(&self, block_dim: &Dim3) -> usize {
        self.block.1 as usize * block_dim.y as usize + self.thread.1 as usize
    }
}

/// Run `lane_fn(lane, num_lanes)` once for every lane of the launch.
///
/// Lanes carry no ordering guarantee relative to each other. Kernels must
/// only write indices their lane owns.
pub fn for_each_lane<F>(cfg: &LaunchConfig, lane_fn: F)
where
    F: Fn(usize, usize) + Sync + Send,
{
    let num_lanes = cfg.num_lanes();
    let tpb = cfg.threads_per_block();
    if num_lanes == 0 {
        return;
    }

    let run_block = |block: usize| {
        let first = block * tpb;
        for lane in first..first + tpb {
            lane_fn(lane, num_lanes);
        }
    };

    #[cfg(feature = "rayon")]
    {
        (0..cfg.num_blocks())
            .into_par_iter()
            .with_min_len(cfg.min_blocks_per_task)
            .for_each(run_block);
    }

    #[cfg(not(feature = "rayon"))]
    {
        (0..cfg.num_blocks()).for_each(run_block);
    }
}

/// Grid-stride loop: lane `l` visits `l, l + num_lanes, l + 2*num_lanes, ...`
///
/// Correct for any runnable geometry, including `num_lanes < len`. A given
/// index is always visited by the same lane.
#[inline]
pub fn for_each_index<F>(cfg: &LaunchConfig, len: usize, index_fn: F)
where
    F: Fn(usize) + Sync + Send,
{
    for_each_lane(cfg, |lane, num_lanes| {
        let mut i = lane;
        while i < len {
            index_fn(i);
            i += num_lanes;
        }
    });
}

/// Run `block_fn(block_idx)` once per block of the launch.
///
/// The closure owns the whole block: it iterates its threads itself, phase
/// by phase, so every phase of every thread completes before the next one
/// starts. That is the group barrier of cooperative kernels.
pub fn for_each_block<F>(cfg: &LaunchConfig, block_fn: F)
where
    F: Fn((u32, u32, u32)) + Sync + Send,
{
    if !cfg.is_runnable() {
        return;
    }
    let grid = cfg.grid_dim;

    #[cfg(feature = "rayon")]
    {
        (0..cfg.num_blocks())
            .into_par_iter()
            .with_min_len(cfg.min_blocks_per_task)
            .for_each(|b| block_fn(grid.unflatten(b)));
    }

    #[cfg(not(feature = "rayon"))]
    {
        (0..cfg.num_blocks()).for_each(|b| block_fn(grid.unflatten(b)));
    }
}

/// Iterate the threads of one block in linear order
#[inline]
pub fn block_threads(block: (u32, u32, u32), block_dim: Dim3) -> impl Iterator<Item = ThreadIdx> {
    (0..block_dim.volume()).map(move |t| ThreadIdx {
        block,
        thread: block_dim.unflatten(t),
    })
}
