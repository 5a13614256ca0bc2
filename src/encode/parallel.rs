//! Parallel rendering helpers.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::options::EncodeOptions;

pub(crate) fn should_parallelize(total_items: usize, options: &EncodeOptions) -> bool {
    cfg!(feature = "parallel") && total_items > 1 && total_items >= options.parallel_threshold
}

#[cfg(feature = "parallel")]
pub(crate) fn map_items<T, R, F>(items: &[T], func: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    items.par_iter().map(func).collect()
}

#[cfg(not(feature = "parallel"))]
pub(crate) fn map_items<T, R, F>(items: &[T], func: F) -> Vec<R>
where
    F: Fn(&T) -> R,
{
    items.iter().map(func).collect()
}
