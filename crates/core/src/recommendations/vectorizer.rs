//! Term-frequency / inverse-document-frequency vectors over product documents.

use std::collections::{BTreeMap, BTreeSet};

use super::RecommendationError;

/// English stop words, the list scikit-learn's `ENGLISH_STOP_WORDS` ships.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "across", "after", "afterwards", "again", "against", "all", "almost",
    "alone", "along", "already", "also", "although", "always", "am", "among", "amongst",
    "amoungst", "amount", "an", "and", "another", "any", "anyhow", "anyone", "anything", "anyway",
    "anywhere", "are", "around", "as", "at", "back", "be", "became", "because", "become",
    "becomes", "becoming", "been", "before", "beforehand", "behind", "being", "below", "beside",
    "besides", "between", "beyond", "bill", "both", "bottom", "but", "by", "call", "can",
    "cannot", "cant", "co", "con", "could", "couldnt", "cry", "de", "describe", "detail", "do",
    "done", "down", "due", "during", "each", "eg", "eight", "either", "eleven", "else",
    "elsewhere", "empty", "enough", "etc", "even", "ever", "every", "everyone", "everything",
    "everywhere", "except", "few", "fifteen", "fifty", "fill", "find", "fire", "first", "five",
    "for", "former", "formerly", "forty", "found", "four", "from", "front", "full", "further",
    "get", "give", "go", "had", "has", "hasnt", "have", "he", "hence", "her", "here",
    "hereafter", "hereby", "herein", "hereupon", "hers", "herself", "him", "himself", "his",
    "how", "however", "hundred", "i", "ie", "if", "in", "inc", "indeed", "interest", "into",
    "is", "it", "its", "itself", "keep", "last", "latter", "latterly", "least", "less", "ltd",
    "made", "many", "may", "me", "meanwhile", "might", "mill", "mine", "more", "moreover",
    "most", "mostly", "move", "much", "must", "my", "myself", "name", "namely", "neither",
    "never", "nevertheless", "next", "nine", "no", "nobody", "none", "noone", "nor", "not",
    "nothing", "now", "nowhere", "of", "off", "often", "on", "once", "one", "only", "onto",
    "or", "other", "others", "otherwise", "our", "ours", "ourselves", "out", "over", "own",
    "part", "per", "perhaps", "please", "put", "rather", "re", "same", "see", "seem", "seemed",
    "seeming", "seems", "serious", "several", "she", "should", "show", "side", "since",
    "sincere", "six", "sixty", "so", "some", "somehow", "someone", "something", "sometime",
    "sometimes", "somewhere", "still", "such", "system", "take", "ten", "than", "that", "the",
    "their", "them", "themselves", "then", "thence", "there", "thereafter", "thereby",
    "therefore", "therein", "thereupon", "these", "they", "thick", "thin", "third", "this",
    "those", "though", "three", "through", "throughout", "thru", "thus", "to", "together",
    "too", "top", "toward", "towards", "twelve", "twenty", "two", "un", "under", "until", "up",
    "upon", "us", "very", "via", "was", "we", "well", "were", "what", "whatever", "when",
    "whence", "whenever", "where", "whereafter", "whereas", "whereby", "wherein", "whereupon",
    "wherever", "whether", "which", "while", "whither", "who", "whoever", "whole", "whom",
    "whose", "why", "will", "with", "within", "without", "would", "yet", "you", "your", "yours",
    "yourself", "yourselves",
];

/// Lowercased runs of two or more word characters, stop words removed.
pub fn tokenize(document: &str) -> impl Iterator<Item = String> + '_ {
    document
        .split(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
        .filter(|token| token.chars().nth(1).is_some())
        .map(str::to_lowercase)
        .filter(|token| !STOP_WORDS.contains(&token.as_str()))
}

/// Non-zero entries of a feature vector, ordered by column index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SparseRow {
    entries: Vec<(usize, f64)>,
}

impl SparseRow {
    /// Builds a row from `(column, weight)` pairs; zero weights are dropped and
    /// repeated columns are summed.
    pub fn from_entries(entries: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut columns: BTreeMap<usize, f64> = BTreeMap::new();
        for (column, weight) in entries {
            *columns.entry(column).or_default() += weight;
        }
        Self { entries: columns.into_iter().filter(|(_, weight)| *weight != 0.0).collect() }
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, column: usize) -> f64 {
        self.entries
            .binary_search_by_key(&column, |(index, _)| *index)
            .map(|position| self.entries[position].1)
            .unwrap_or(0.0)
    }

    /// Sets a column past every stored one, e.g. an appended feature.
    pub fn push(&mut self, column: usize, weight: f64) {
        debug_assert!(self.entries.last().map_or(true, |(last, _)| *last < column));
        if weight != 0.0 {
            self.entries.push((column, weight));
        }
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, weight)| weight * weight).sum::<f64>().sqrt()
    }

    /// Merge-join over the two index lists.
    pub fn dot(&self, other: &SparseRow) -> f64 {
        let (mut left, mut right) = (self.entries.iter().peekable(), other.entries.iter().peekable());
        let mut sum = 0.0;
        while let (Some((a_index, a_weight)), Some((b_index, b_weight))) = (left.peek(), right.peek()) {
            match a_index.cmp(b_index) {
                std::cmp::Ordering::Less => {
                    left.next();
                }
                std::cmp::Ordering::Greater => {
                    right.next();
                }
                std::cmp::Ordering::Equal => {
                    sum += a_weight * b_weight;
                    left.next();
                    right.next();
                }
            }
        }
        sum
    }
}

/// Vocabulary and smoothed idf weights fitted on one set of documents.
///
/// Fitted per computation; the vocabulary is whatever the fitting documents
/// contain, and terms outside it are ignored by [`TfidfVectorizer::transform`].
#[derive(Clone, Debug, PartialEq)]
pub struct TfidfVectorizer {
    vocabulary: BTreeMap<String, usize>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    pub fn fit(documents: &[String]) -> Result<Self, RecommendationError> {
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();
        for document in documents {
            let terms: BTreeSet<String> = tokenize(document).collect();
            for term in terms {
                *document_frequency.entry(term).or_default() += 1;
            }
        }

        if document_frequency.is_empty() {
            return Err(RecommendationError::EmptyVocabulary);
        }

        let total = documents.len() as f64;
        let mut vocabulary = BTreeMap::new();
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (index, (term, frequency)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + total) / (1.0 + frequency as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        Ok(Self { vocabulary, idf })
    }

    pub fn vocabulary_len(&self) -> usize {
        self.idf.len()
    }

    pub fn term_index(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// L2-normalized sparse rows; a document with no known terms is empty.
    pub fn transform(&self, documents: &[String]) -> Vec<SparseRow> {
        documents.iter().map(|document| self.transform_one(document)).collect()
    }

    fn transform_one(&self, document: &str) -> SparseRow {
        let counts = tokenize(document)
            .filter_map(|term| self.term_index(&term))
            .map(|index| (index, 1.0));
        let mut row = SparseRow::from_entries(counts);

        for (index, weight) in &mut row.entries {
            *weight *= self.idf[*index];
        }

        let norm = row.norm();
        if norm > 0.0 {
            for (_, weight) in &mut row.entries {
                *weight /= norm;
            }
        }
        row
    }
}
