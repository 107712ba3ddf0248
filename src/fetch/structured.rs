use colored::Colorize;

use super::fetch_file;
use crate::{config::FetchConfig, error::FetchError, http::Transport, manifest, sources::SourceDescriptor};

/// Weight files to fetch for `src`: whatever the descriptor at `descriptor`
/// lists, or the source's fallback list when it lists nothing.
pub fn weight_list(descriptor: &std::path::Path, src: &SourceDescriptor) -> Vec<String> {
    let listed = match manifest::read_descriptor(descriptor) {
        Ok(doc) => manifest::weight_files(&doc),
        Err(err) => {
            println!("{} could not read weight list: {}", "×".red(), err);
            Vec::new()
        }
    };
    if listed.is_empty() {
        tracing::debug!(source = %src.name, "descriptor lists no weights, using fallback list");
        src.weights_pattern.clone()
    } else {
        listed
    }
}

/// Descriptor first, then every shard. The first shard that fails abandons
/// the source; shards already written stay on disk.
pub async fn fetch_source<T: Transport>(transport: &T, src: &SourceDescriptor, config: &FetchConfig) -> Result<Vec<String>, FetchError> {
    let descriptor = config.output_dir.join(manifest::DESCRIPTOR_FILE);
    fetch_file(transport, &src.model_json, &descriptor, config.timeouts.file).await?;

    match manifest::rewrite_descriptor(&descriptor) {
        Ok(_) => println!("{} fixed: paths in {}", "✓".green(), manifest::DESCRIPTOR_FILE),
        Err(err) => println!("{} failed to fix {}: {}", "×".red(), manifest::DESCRIPTOR_FILE, err),
    }

    let weights = weight_list(&descriptor, src);
    println!("Downloading {} weight files...", weights.len());

    let mut files = vec![manifest::DESCRIPTOR_FILE.to_string()];
    for name in weights {
        if !manifest::is_plain_file_name(&name) {
            return Err(FetchError::DescriptorParse(format!("unusable weight file name {:?}", name)));
        }
        let dest = config.output_dir.join(&name);
        fetch_file(transport, &src.weight_url(&name), &dest, config.timeouts.file).await?;
        files.push(name);
    }
    Ok(files)
}
