//! Keyword classification of free-text survey answers.

mod sink;

pub use sink::{SurveyError, SurveyRecord, SurveySink};

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

/// Broad intent a keyword signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Queja,
    Recomendacion,
    Satisfaccion,
}

const COMPLAINT_KEYWORDS: &[&str] = &[
    "queja", "quejar", "quejarse", "quejas", "malo", "pesimo", "terrible", "problema", "fallo",
    "defecto", "dificil", "complicado", "error", "lento", "no funciona", "defectuoso",
    "inaccesible", "frustrante",
];

const RECOMMENDATION_KEYWORDS: &[&str] = &[
    "recomendacion", "recomendar", "recomendaciones", "sugerencia", "mejora", "mejorar",
    "propuesta", "ideas", "añadir", "agregar", "implementar", "futuro", "desarrollar", "innovar",
    "sugerir",
];

const SATISFACTION_KEYWORDS: &[&str] = &[
    "satisfecho", "satisfecha", "satisfaccion", "satisfechos", "satisfechas", "satisfactorio",
    "satisfactoria", "excelente", "bueno", "perfecto", "agradable", "feliz", "facil", "simple",
    "rapido", "util", "eficiente", "contento", "increible", "genial",
];

struct Keyword {
    word: &'static str,
    category: Category,
    pattern: Regex,
}

fn keywords() -> &'static [Keyword] {
    static KEYWORDS: OnceLock<Vec<Keyword>> = OnceLock::new();
    KEYWORDS.get_or_init(|| {
        let lists = [
            (Category::Queja, COMPLAINT_KEYWORDS),
            (Category::Recomendacion, RECOMMENDATION_KEYWORDS),
            (Category::Satisfaccion, SATISFACTION_KEYWORDS),
        ];
        lists
            .into_iter()
            .flat_map(|(category, words)| {
                words.iter().map(move |&word| Keyword {
                    word,
                    category,
                    pattern: Regex::new(&format!(r"\b{}\b", regex::escape(word)))
                        .expect("escaped keyword is a valid regex"),
                })
            })
            .collect()
    })
}

fn sentence_break() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"[.!?]\s+|\n\s*\n").expect("sentence pattern is valid"))
}

fn punctuation() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"[^\w\s]").expect("punctuation pattern is valid"))
}

/// Split a paragraph into sentences on `.`, `!`, `?` or blank lines.
///
/// Terminal punctuation stays with its sentence; empty pieces are dropped.
pub fn split_sentences(paragraph: &str) -> Vec<&str> {
    let text = paragraph.trim();
    let mut sentences = Vec::new();
    let mut start = 0;

    for m in sentence_break().find_iter(text) {
        let first = text[m.start()..].chars().next();
        let end = match first {
            Some(c @ ('.' | '!' | '?')) => m.start() + c.len_utf8(),
            _ => m.start(),
        };
        sentences.push(text[start..end].trim());
        start = m.end();
    }
    sentences.push(text[start..].trim());

    sentences.retain(|s| !s.is_empty());
    sentences
}

fn normalize(sentence: &str) -> String {
    punctuation()
        .replace_all(&sentence.to_lowercase(), "")
        .into_owned()
}

/// Keywords detected in one answer
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Classification {
    /// Unique keywords in keyword-list order
    pub detected_keywords: Vec<String>,
    /// First sentence (as written) each keyword was found in
    pub matched_sentences: BTreeMap<String, String>,
    pub categories: Vec<Category>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.detected_keywords.is_empty()
    }
}

pub fn classify(text: &str) -> Classification {
    let sentences: Vec<(&str, String)> = split_sentences(text)
        .into_iter()
        .map(|s| (s, normalize(s)))
        .collect();

    let mut result = Classification::default();

    for keyword in keywords() {
        let hit = sentences
            .iter()
            .find(|(_, normalized)| keyword.pattern.is_match(normalized));

        if let Some((original, _)) = hit {
            result.detected_keywords.push(keyword.word.to_string());
            result
                .matched_sentences
                .insert(keyword.word.to_string(), original.to_string());
            if !result.categories.contains(&keyword.category) {
                result.categories.push(keyword.category);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sentences() {
        let text = "Todo bien. ¿Pero por qué tarda?\n\nOtra cosa!  Fin";
        assert_eq!(
            split_sentences(text),
            vec!["Todo bien.", "¿Pero por qué tarda?", "Otra cosa!", "Fin"]
        );
        assert!(split_sentences("   ").is_empty());
    }

    #[test]
    fn test_detects_categories_and_first_sentence() {
        let result = classify("El sistema es muy LENTO. Sería bueno mejorar la app. Está lento hoy.");
        assert_eq!(result.detected_keywords, vec!["lento", "mejorar", "bueno"]);
        assert_eq!(
            result.categories,
            vec![Category::Queja, Category::Recomendacion, Category::Satisfaccion]
        );
        assert_eq!(result.matched_sentences["lento"], "El sistema es muy LENTO.");
    }

    #[test]
    fn test_word_boundaries() {
        // "malo" must not match inside "malogrado"; punctuation is ignored
        assert!(classify("Un producto malogrado").is_empty());
        assert_eq!(classify("¡Malo!").detected_keywords, vec!["malo"]);
    }

    #[test]
    fn test_multi_word_keyword() {
        let result = classify("La app no funciona desde ayer");
        assert_eq!(result.detected_keywords, vec!["no funciona"]);
    }

    #[test]
    fn test_accented_keyword() {
        assert_eq!(classify("Podrían añadir más tiendas").detected_keywords, vec!["añadir"]);
    }
}
