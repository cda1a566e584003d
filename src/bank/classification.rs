use lazy_static::lazy_static;
use regex::Regex;
use unidecode::unidecode;

pub const BLOCK_1: &str = "Block 1";
pub const UNSPECIFIED_TOPIC: &str = "unspecified";

// Block 1 is the only block with a populated topic table.
const BLOCK_1_TOPICS: &[(u32, &str)] = &[
    (1, "Tema 1. La Constitución Española de 1978"),
    (2, "Tema 2. Derechos y deberes fundamentales"),
    (3, "Tema 3. La Corona"),
    (4, "Tema 4. Las Cortes Generales"),
    (5, "Tema 5. El Gobierno y la Administración"),
    (6, "Tema 6. El Poder Judicial"),
    (7, "Tema 7. Organización territorial del Estado"),
    (8, "Tema 8. La Unión Europea"),
    (9, "Tema 9. El procedimiento administrativo común"),
    (10, "Tema 10. Igualdad y protección de datos"),
];

lazy_static! {
    static ref BLOCK_REGEX: Regex =
        Regex::new(r"^\s*(?:bloque|block|blq\.?|b)\s*[-_.:#]?\s*0*(\d+)\b").unwrap();
    static ref TOPIC_ID_REGEX: Regex =
        Regex::new(r"^\s*(?:tema|topic|t)?\s*[-_.:#]?\s*0*(\d+)\b").unwrap();
    static ref COMBINED_HINT_REGEX: Regex = Regex::new(
        r"\b(?:bloque|block|b)\s*0*(\d+)\s*[-_,/ ]*\s*(?:tema|topic|t)\s*0*(\d+)\b"
    )
    .unwrap();
    static ref TOPIC_HINT_REGEX: Regex = Regex::new(r"\b(?:tema|topic|t)\s*0*(\d+)\b").unwrap();
}

fn fold(text: &str) -> String {
    unidecode(text).to_lowercase()
}

pub fn block_1_topic(id: u32) -> Option<&'static str> {
    BLOCK_1_TOPICS
        .iter()
        .find(|(topic_id, _)| *topic_id == id)
        .map(|(_, name)| *name)
}

/// Maps `block1`, `B 1`, `BLOQUE 1` and friends to `Block N`.
pub fn normalize_block(block: &str) -> String {
    BLOCK_REGEX
        .captures(&fold(block))
        .and_then(|captures| captures[1].parse::<u32>().ok())
        .map(|n| format!("Block {}", n))
        .unwrap_or_else(|| block.trim().to_owned())
}

/// Resolves a Block 1 topic to its display name, tolerating trailing descriptive text.
pub fn normalize_block_1_topic(topic: &str) -> String {
    TOPIC_ID_REGEX
        .captures(&fold(topic))
        .and_then(|captures| captures[1].parse::<u32>().ok())
        .and_then(block_1_topic)
        .map(str::to_owned)
        .unwrap_or_else(|| topic.trim().to_owned())
}

fn resolve_topic(block: u32, topic: u32) -> String {
    let known = if block == 1 { block_1_topic(topic) } else { None };
    match known {
        Some(name) => name.to_owned(),
        None => format!("Tema {}", topic),
    }
}

fn infer_from_hints(hints: &[Option<&str>]) -> (String, String) {
    let hint_text = fold(&hints.iter().flatten().copied().collect::<Vec<_>>().join(" "));

    if let Some(captures) = COMBINED_HINT_REGEX.captures(&hint_text) {
        if let (Ok(block), Ok(topic)) = (captures[1].parse::<u32>(), captures[2].parse::<u32>()) {
            return (format!("Block {}", block), resolve_topic(block, topic));
        }
    }

    if let Some(captures) = TOPIC_HINT_REGEX.captures(&hint_text) {
        if let Ok(topic) = captures[1].parse::<u32>() {
            return (BLOCK_1.to_owned(), resolve_topic(1, topic));
        }
    }

    (BLOCK_1.to_owned(), UNSPECIFIED_TOPIC.to_owned())
}

/// Decides the (block, topic) pair of a record.
/// Explicit values win only when both are present; otherwise both are inferred from hints.
pub fn classify(
    block: Option<&str>,
    topic: Option<&str>,
    mock_exam: Option<&str>,
) -> (String, String) {
    let (block, topic) = match (block, topic) {
        (Some(block), Some(topic)) => (normalize_block(block), topic.trim().to_owned()),
        (block, topic) => infer_from_hints(&[topic, block, mock_exam]),
    };
    if block == BLOCK_1 {
        let topic = normalize_block_1_topic(&topic);
        (block, topic)
    } else {
        (block, topic)
    }
}
