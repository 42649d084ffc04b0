//! Keyword tables used by the sentiment rules and the topic classifier
//!
//! A [`Lexicon`] is plain configuration data: it is loaded once (built-in
//! defaults, optionally overridden from YAML) and then shared read-only
//! between classifiers. Matchers are compiled from it by the classifiers.

use aho_corasick::AhoCorasick;
use commentscope_core::{Result, Topic};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// All word lists consumed by the analysis pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    /// Topic keyword lists, in tie-breaking order
    pub topics: Vec<TopicKeywords>,

    /// Patterns for the semantic topic fallback
    pub fallback: FallbackPatterns,

    /// Curated multilingual strong-negative words
    pub strong_negatives: Vec<String>,

    /// Words ignored by keyword extraction
    pub stop_words: Vec<String>,

    /// Interrogative and price-inquiry keywords (multilingual)
    pub question_keywords: Vec<String>,

    /// Phrases that mark a comment as an information request
    pub info_requests: Vec<String>,

    /// Heart, love, and celebration glyphs
    pub positive_emojis: Vec<String>,

    /// Multilingual positive and blessing words
    pub positive_words: Vec<String>,

    /// Word polarity scores for the lexicon fallback backend
    pub polarity: PolarityLexicon,
}

/// Keyword list owned by one topic category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicKeywords {
    pub topic: Topic,
    pub keywords: Vec<String>,
}

/// Pattern groups evaluated by the semantic fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackPatterns {
    pub delivery: Vec<String>,
    pub price: Vec<String>,
    pub service: Vec<String>,
    pub function: Vec<String>,
    pub quality: Vec<String>,
}

/// Scores used to compute a polarity in [-1, 1]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolarityLexicon {
    /// Word to polarity score
    pub words: HashMap<String, f32>,

    /// Words that flip and dampen the next scored word
    pub negations: Vec<String>,

    /// Word to multiplier applied to the next scored word
    pub intensifiers: HashMap<String, f32>,
}

impl Lexicon {
    /// Load from YAML string; missing sections keep their defaults
    pub fn from_yaml(yaml: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let lexicon = Self::from_yaml(&content).map_err(|e| {
            commentscope_core::Error::config(format!(
                "Failed to parse lexicon {}: {}",
                path.display(),
                e
            ))
        })?;
        lexicon.validate()?;
        Ok(lexicon)
    }

    /// Reject tables the classifiers cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.topics.is_empty() {
            return Err(commentscope_core::Error::config(
                "Lexicon must define at least one topic",
            ));
        }

        let mut seen = Vec::with_capacity(self.topics.len());
        for entry in &self.topics {
            if seen.contains(&entry.topic) {
                return Err(commentscope_core::Error::config(format!(
                    "Topic '{}' is defined more than once",
                    entry.topic
                )));
            }
            seen.push(entry.topic);
        }

        Ok(())
    }

    /// Keywords for a topic, if the lexicon defines it
    pub fn keywords_for(&self, topic: Topic) -> Option<&[String]> {
        self.topics
            .iter()
            .find(|entry| entry.topic == topic)
            .map(|entry| entry.keywords.as_slice())
    }
}

/// Substring matcher over a lowercased phrase list
#[derive(Debug, Clone)]
pub struct PhraseSet {
    matcher: AhoCorasick,
    len: usize,
}

impl PhraseSet {
    /// Compile a phrase list; phrases are lowercased, blanks dropped
    pub fn new<S: AsRef<str>>(phrases: &[S]) -> Result<Self> {
        let phrases: Vec<String> = phrases
            .iter()
            .map(|p| p.as_ref().trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();

        let matcher = AhoCorasick::new(&phrases).map_err(|e| {
            commentscope_core::Error::classifier(format!("Failed to build phrase matcher: {}", e))
        })?;

        Ok(Self {
            matcher,
            len: phrases.len(),
        })
    }

    /// True when any phrase occurs in `lowered`, which must already be lowercase
    pub fn contains_any(&self, lowered: &str) -> bool {
        self.len > 0 && self.matcher.is_match(lowered)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

fn scores(list: &[(&str, f32)]) -> HashMap<String, f32> {
    list.iter().map(|(w, s)| (w.to_string(), *s)).collect()
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            topics: default_topics(),
            fallback: FallbackPatterns::default(),
            strong_negatives: words(&[
                // English
                "hate", "worst", "terrible", "horrible", "awful", "disgusting", "pathetic",
                "useless", "trash", "garbage", "scam", "fraud", "fake", "shit", "crap", "sucks",
                "suck", "damn", "hell", "never",
                // Urdu/Hindi transliterations
                "bakwas", "bekar", "kharab", "ganda", "bura", "kachra",
                // Arabic/Urdu
                "wahshat", "kharaab", "ghalat",
            ]),
            stop_words: default_stop_words(),
            question_keywords: words(&[
                // Price and availability
                "price", "cost", "how much", "available", "stock", "buy", "where", "when",
                "what", "which", "who", "how",
                // Uzbek
                "nechi", "necha", "qancha", "narxi", "kvm", "som",
                // Hindi/Urdu
                "kitna", "kaise", "kab", "kaha", "kya",
                // Turkish
                "kaç", "ne kadar", "nerede", "ne zaman",
            ]),
            info_requests: words(&[
                "tell me", "let me know", "can you", "could you", "please", "info",
                "information", "details", "link",
            ]),
            positive_emojis: words(&[
                "❤", "♥", "💕", "💖", "💗", "💓", "💝", "😊", "😍", "🥰", "😘", "🙏", "👍", "👏",
                "🎉", "✨", "⭐", "🌟", "💯", "🔥", "😁", "😄", "😃", "🤗", "💪", "🎊",
            ]),
            positive_words: words(&[
                // English
                "love", "great", "amazing", "wonderful", "excellent", "best", "good", "nice",
                "beautiful", "perfect", "awesome", "fantastic",
                // Arabic/Urdu/Turkish
                "mashallah", "alhamdulillah", "inshaallah", "inshallah", "masha allah",
                "alhamdu lillah", "in sha allah", "allah", "shukr", "baraka",
                // Uzbek/Turkish
                "olloh", "alloh", "raxmat", "yaxshi", "zoʻr", "ajoyib", "nasib",
                // General blessings
                "bless", "blessing", "blessed", "congrats", "congratulations",
            ]),
            polarity: PolarityLexicon::default(),
        }
    }
}

fn default_topics() -> Vec<TopicKeywords> {
    vec![
        TopicKeywords {
            topic: Topic::Delivery,
            keywords: words(&[
                "delivery", "late", "delayed", "shipping", "ship", "arrive", "arrived", "waiting",
                "never received", "where is", "not delivered", "slow delivery", "tracking",
                "package", "courier", "shipment", "transit", "dispatch", "order", "missing",
                "lost", "stuck", "still waiting", "not arrived", "hasnt arrived",
                "taking forever", "weeks", "month", "days", "when will", "eta", "delivery time",
            ]),
        },
        TopicKeywords {
            topic: Topic::BadQuality,
            keywords: words(&[
                "quality", "poor", "broken", "damaged", "defective", "cheap", "terrible",
                "horrible", "trash", "garbage", "waste", "bad quality", "low quality", "fake",
                "counterfeit", "not original", "durability", "poorly made", "falls apart",
                "flimsy", "weak", "fragile", "disappointing", "substandard", "inferior",
                "shoddy", "rubbish", "awful", "pathetic", "useless", "worthless", "junk", "crap",
            ]),
        },
        TopicKeywords {
            topic: Topic::CustomerService,
            keywords: words(&[
                "customer service", "support", "service", "representative", "staff", "rude",
                "unprofessional", "no response", "ignored", "unhelpful", "poor service",
                "no help", "attitude", "disrespectful", "agent", "customer care", "help desk",
                "support team", "service team", "no reply", "dont respond", "wont help",
                "bad service", "worst service", "horrible service", "terrible support",
                "useless support", "no support",
            ]),
        },
        TopicKeywords {
            topic: Topic::Pricing,
            keywords: words(&[
                "price", "expensive", "costly", "overpriced", "too much", "money", "refund",
                "cost", "cheap", "not worth", "value", "rip off", "scam", "waste of money",
                "overcharge", "ripoff", "rip-off", "too expensive", "so expensive",
                "very expensive", "highly priced", "charges", "charged", "payment", "paid",
                "overpaid", "not worth it", "not worth the price", "poor value", "bad value",
                "money back",
            ]),
        },
        TopicKeywords {
            topic: Topic::ProductIssues,
            keywords: words(&[
                "not working", "broken", "malfunction", "issue", "problem", "error", "bug",
                "glitch", "fault", "defect", "doesnt work", "stopped working", "not functioning",
                "fail", "failed", "failure", "crashes", "crash", "freezes", "freeze", "wont work",
                "cant use", "unusable", "malfunctioning", "problems", "issues", "technical",
                "technical issue", "not functional", "dysfunction", "broke", "broke down", "dead",
            ]),
        },
        TopicKeywords {
            topic: Topic::FalseAdvertising,
            keywords: words(&[
                "advertised", "misleading", "false", "lie", "lied", "not as shown", "different",
                "not same", "deceiving", "fraud", "scam", "fake", "not as described",
                "misleading ad", "false advertising", "lies", "deceptive", "not what shown",
                "looks different", "doesnt match", "wrong product", "different product",
                "bait and switch", "scammed", "misleading description", "incorrect description",
                "not authentic",
            ]),
        },
    ]
}

impl Default for FallbackPatterns {
    fn default() -> Self {
        Self {
            delivery: words(&[
                "deliver", "ship", "order", "receive", "arrive", "wait", "late", "delay",
                "package", "yetkazib", "buyurtma",
            ]),
            price: words(&[
                "price", "money", "expensive", "cost", "paid", "refund", "worth", "value",
                "qimmat", "narx", "pul", "mehnga", "paisa", "rupee",
            ]),
            service: words(&[
                "service", "staff", "support", "help", "response", "rude", "unprofessional",
                "ignored", "attitude", "xizmat",
            ]),
            function: words(&[
                "work", "working", "broken", "issue", "problem", "error", "bug", "crash", "fail",
                "buzilgan", "ishlamaydi",
            ]),
            quality: words(&[
                "bad", "worst", "terrible", "horrible", "awful", "poor", "disappointing",
                "disappointed", "not good", "useless", "trash", "garbage", "waste", "pathetic",
                "yomon", "kharab",
            ]),
        }
    }
}

impl Default for PolarityLexicon {
    fn default() -> Self {
        Self {
            words: scores(&[
                // Positive
                ("good", 0.7), ("great", 0.8), ("excellent", 1.0), ("amazing", 0.6),
                ("awesome", 1.0), ("wonderful", 1.0), ("fantastic", 0.4), ("perfect", 1.0),
                ("best", 1.0), ("better", 0.5), ("nice", 0.6), ("love", 0.5), ("loved", 0.7),
                ("like", 0.2), ("happy", 0.8), ("glad", 0.5), ("beautiful", 0.85),
                ("lovely", 0.5), ("cool", 0.35), ("fine", 0.4), ("fast", 0.2), ("quick", 0.33),
                ("recommend", 0.4), ("recommended", 0.4), ("satisfied", 0.5), ("pleased", 0.5),
                ("thanks", 0.2), ("thank", 0.2), ("helpful", 0.4), ("works", 0.2),
                ("worth", 0.3), ("super", 0.33), ("fresh", 0.3), ("comfortable", 0.4),
                ("friendly", 0.375), ("easy", 0.43), ("reliable", 0.4),
                // Negative
                ("bad", -0.7), ("terrible", -1.0), ("horrible", -1.0), ("awful", -1.0),
                ("worst", -1.0), ("worse", -0.4), ("poor", -0.4), ("disappointed", -0.75),
                ("disappointing", -0.6), ("useless", -0.5), ("hate", -0.8), ("hated", -0.9),
                ("broken", -0.4), ("broke", -0.4), ("damaged", -0.5), ("defective", -0.5),
                ("slow", -0.3), ("late", -0.3), ("delayed", -0.3), ("wrong", -0.5),
                ("expensive", -0.5), ("overpriced", -0.6), ("fake", -0.5), ("cheap", -0.2),
                ("rude", -0.3), ("sad", -0.5), ("angry", -0.5), ("annoying", -0.8),
                ("ugly", -0.7), ("dirty", -0.6), ("stupid", -0.8), ("pathetic", -1.0),
                ("disgusting", -1.0), ("garbage", -0.8), ("trash", -0.8), ("waste", -0.5),
                ("scam", -0.8), ("fraud", -0.8), ("lost", -0.2), ("missing", -0.2),
                ("never", -0.2), ("nothing", -0.2), ("problem", -0.3), ("failed", -0.5),
                ("fail", -0.5), ("sucks", -0.3), ("crap", -0.8), ("unhappy", -0.6),
                ("weak", -0.375), ("flimsy", -0.5),
            ]),
            negations: words(&[
                "not", "no", "never", "dont", "don't", "doesnt", "doesn't", "didnt", "didn't",
                "isnt", "isn't", "wasnt", "wasn't", "cant", "can't", "wont", "won't",
            ]),
            intensifiers: scores(&[
                ("very", 1.3), ("really", 1.3), ("so", 1.3), ("extremely", 1.5),
                ("totally", 1.4), ("absolutely", 1.5), ("too", 1.2), ("super", 1.3),
                ("quite", 1.1), ("slightly", 0.7), ("somewhat", 0.8),
            ]),
        }
    }
}

/// English stop words ignored by keyword extraction
fn default_stop_words() -> Vec<String> {
    words(&[
        "i", "me", "my", "myself", "we", "our", "ours", "ourselves", "you", "you're", "you've",
        "you'll", "you'd", "your", "yours", "yourself", "yourselves", "he", "him", "his",
        "himself", "she", "she's", "her", "hers", "herself", "it", "it's", "its", "itself",
        "they", "them", "their", "theirs", "themselves", "what", "which", "who", "whom", "this",
        "that", "that'll", "these", "those", "am", "is", "are", "was", "were", "be", "been",
        "being", "have", "has", "had", "having", "do", "does", "did", "doing", "a", "an", "the",
        "and", "but", "if", "or", "because", "as", "until", "while", "of", "at", "by", "for",
        "with", "about", "against", "between", "into", "through", "during", "before", "after",
        "above", "below", "to", "from", "up", "down", "in", "out", "on", "off", "over", "under",
        "again", "further", "then", "once", "here", "there", "when", "where", "why", "how",
        "all", "any", "both", "each", "few", "more", "most", "other", "some", "such", "no",
        "nor", "not", "only", "own", "same", "so", "than", "too", "very", "s", "t", "can",
        "will", "just", "don", "don't", "should", "should've", "now", "d", "ll", "m", "o", "re",
        "ve", "y", "ain", "aren", "aren't", "couldn", "couldn't", "didn", "didn't", "doesn",
        "doesn't", "hadn", "hadn't", "hasn", "hasn't", "haven", "haven't", "isn", "isn't", "ma",
        "mightn", "mightn't", "mustn", "mustn't", "needn", "needn't", "shan", "shan't",
        "shouldn", "shouldn't", "wasn", "wasn't", "weren", "weren't", "won", "won't", "wouldn",
        "wouldn't",
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lexicon_is_valid() {
        let lexicon = Lexicon::default();
        lexicon.validate().unwrap();

        let order: Vec<Topic> = lexicon.topics.iter().map(|t| t.topic).collect();
        assert_eq!(order, Topic::ALL.to_vec());
        assert!(lexicon.keywords_for(Topic::Pricing).unwrap().contains(&"refund".to_string()));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
positive_words: ["splendid"]
topics:
  - topic: Pricing
    keywords: ["pricey"]
"#;

        let lexicon = Lexicon::from_yaml(yaml).unwrap();
        assert_eq!(lexicon.positive_words, vec!["splendid".to_string()]);
        assert_eq!(lexicon.topics.len(), 1);
        assert_eq!(lexicon.topics[0].topic, Topic::Pricing);
        assert_eq!(lexicon.stop_words, Lexicon::default().stop_words);
        assert_eq!(lexicon.fallback, FallbackPatterns::default());
    }

    #[test]
    fn test_duplicate_topic_rejected() {
        let yaml = r#"
topics:
  - topic: Delivery
    keywords: ["late"]
  - topic: delivery
    keywords: ["slow"]
"#;

        let lexicon = Lexicon::from_yaml(yaml).unwrap();
        assert!(lexicon.validate().is_err());
    }

    #[test]
    fn test_lexicon_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexicon.yaml");
        std::fs::write(&path, "strong_negatives: [\"meh\"]\n").unwrap();

        let lexicon = Lexicon::from_file(&path).unwrap();
        assert_eq!(lexicon.strong_negatives, vec!["meh".to_string()]);
    }

    #[test]
    fn test_phrase_set_matching() {
        let set = PhraseSet::new(&["Let me know", "info"]).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains_any("please let me know the size"));
        assert!(set.contains_any("more information"));
        assert!(!set.contains_any("nothing here"));

        let empty = PhraseSet::new::<&str>(&[]).unwrap();
        assert!(empty.is_empty());
        assert!(!empty.contains_any("anything"));
    }
}
