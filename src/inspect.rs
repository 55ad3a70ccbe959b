//! Bulk inspection of the indexed store (`prr list`).

use anyhow::Result;

use crate::config::Config;
use crate::store::VectorStore;

pub async fn run_list(config: &Config) -> Result<()> {
    let store = VectorStore::connect(config).await?;

    let result = list_inner(&store).await;
    store.close().await;
    result
}

async fn list_inner(store: &VectorStore) -> Result<()> {
    let docs = store.list_all().await?;

    if docs.is_empty() {
        println!("No documents indexed.");
        return Ok(());
    }

    println!("{} indexed documents", docs.len());
    for doc in &docs {
        let preview: String = doc.content.chars().take(60).collect();
        println!("  [{}] {} ({} dims)", doc.id, doc.path, doc.vector.len());
        println!("      \"{}\"", preview);
    }

    Ok(())
}
