pub mod resource_store_trait;

#[cfg(test)]
pub mod memory_store;
