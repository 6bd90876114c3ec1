pub mod mr;
pub mod mrapps;
pub mod mrrt;
pub(crate) mod util;

#[cfg(test)]
mod test_mr;
