pub use shale_shred::*;
pub use {
    shale_dtype as dtype, shale_error as error, shale_scalar as scalar, shale_shred as shred,
};
