#[cfg(test)]
mod in_memory;
mod pinecone;

#[cfg(test)]
pub use in_memory::InMemoryVectorStore;
pub use pinecone::PineconeVectorStore;
