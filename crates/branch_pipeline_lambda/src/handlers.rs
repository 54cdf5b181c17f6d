pub mod bootstrap_probe;
pub mod branch_router;
pub mod sandbox;

#[cfg(test)]
pub(crate) mod test_support;
