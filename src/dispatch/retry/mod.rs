mod policy;

pub use policy::RetryPolicy;

#[cfg(test)]
mod tests;
