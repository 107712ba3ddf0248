use serde::{Deserialize, Serialize};

/// One place the model can be assembled from file by file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDescriptor {
    pub name: String,
    pub model_json: String,
    pub weights_base: String,
    /// Used verbatim when the descriptor does not list its shards.
    #[serde(default)]
    pub weights_pattern: Vec<String>,
}

impl SourceDescriptor {
    pub fn new(name: &str, model_json: &str, weights_base: &str, weights_pattern: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            model_json: model_json.to_string(),
            weights_base: weights_base.to_string(),
            weights_pattern: weights_pattern.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn weight_url(&self, file_name: &str) -> String {
        format!("{}{}", self.weights_base, file_name)
    }
}

pub const YOLOV8N_SHARDS: [&str; 4] = [
    "group1-shard1of4.bin",
    "group1-shard2of4.bin",
    "group1-shard3of4.bin",
    "group1-shard4of4.bin",
];

pub fn default_archive_urls() -> Vec<String> {
    vec![
        "https://github.com/Hyuto/yolov8-tfjs/releases/download/yolov8n/yolov8n-tfjs-web_model.zip".into(),
        "https://huggingface.co/Hyuto/yolov8-tfjs/resolve/main/yolov8n-tfjs-web_model.zip".into(),
    ]
}

pub fn default_sources() -> Vec<SourceDescriptor> {
    vec![
        SourceDescriptor::new(
            "GitHub Raw",
            "https://github.com/Hyuto/yolov8-tfjs/raw/master/yolov8n/model.json",
            "https://github.com/Hyuto/yolov8-tfjs/raw/master/yolov8n/",
            &YOLOV8N_SHARDS,
        ),
        SourceDescriptor::new(
            "jsDelivr CDN",
            "https://cdn.jsdelivr.net/gh/Hyuto/yolov8-tfjs@master/yolov8n/model.json",
            "https://cdn.jsdelivr.net/gh/Hyuto/yolov8-tfjs@master/yolov8n/",
            &YOLOV8N_SHARDS,
        ),
        SourceDescriptor::new(
            "HuggingFace",
            "https://huggingface.co/Hyuto/yolov8-tfjs/resolve/main/yolov8n/model.json",
            "https://huggingface.co/Hyuto/yolov8-tfjs/resolve/main/yolov8n/",
            &YOLOV8N_SHARDS,
        ),
        // Smaller detector, still usable by the app if YOLOv8 is unreachable.
        SourceDescriptor::new(
            "COCO-SSD TensorFlow.js",
            "https://storage.googleapis.com/tfjs-models/savedmodel/ssd_mobilenet_v2/model.json",
            "https://storage.googleapis.com/tfjs-models/savedmodel/ssd_mobilenet_v2/",
            &["group1-shard1of3.bin", "group1-shard2of3.bin", "group1-shard3of3.bin"],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_url_is_plain_concatenation() {
        let src = SourceDescriptor::new("x", "https://h/m.json", "https://h/w/", &[]);
        assert_eq!(src.weight_url("group1-shard1of4.bin"), "https://h/w/group1-shard1of4.bin");
    }

    #[test]
    fn defaults_are_ordered_and_complete() {
        let sources = default_sources();
        assert_eq!(sources.len(), 4);
        assert_eq!(sources[0].name, "GitHub Raw");
        assert!(sources.iter().all(|s| !s.weights_pattern.is_empty() && s.weights_base.ends_with('/')));
        assert_eq!(default_archive_urls().len(), 2);
    }
}
