//! Search and category filtering for the document list

use super::document::Document;

/// Category selector shown as chips on the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FilterCategory {
    #[default]
    All,
    Folder,
    Shared,
}

impl FilterCategory {
    pub const ALL: [FilterCategory; 3] = [Self::All, Self::Folder, Self::Shared];

    pub fn label(self) -> &'static str {
        match self {
            Self::All => "Tümü",
            Self::Folder => "Klasörler",
            Self::Shared => "Paylaşılanlar",
        }
    }

    fn matches(self, doc: &Document) -> bool {
        match self {
            Self::All => true,
            Self::Folder => doc.is_folder(),
            Self::Shared => doc.is_shared(),
        }
    }
}

/// Documents whose title contains `term` (case-insensitive) and that match
/// `category`, in their original order
pub fn filter_documents<'a>(
    docs: &'a [Document],
    term: &str,
    category: FilterCategory,
) -> Vec<&'a Document> {
    let needle = term.to_lowercase();
    docs.iter()
        .filter(|doc| doc.title.to_lowercase().contains(&needle) && category.matches(doc))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::document::seed_documents;

    fn titles(docs: &[&Document]) -> Vec<String> {
        docs.iter().map(|d| d.title.clone()).collect()
    }

    #[test]
    fn test_empty_term_all_is_identity() {
        let docs = seed_documents();
        let filtered = filter_documents(&docs, "", FilterCategory::All);
        assert_eq!(filtered.len(), docs.len());
        assert!(filtered.iter().zip(&docs).all(|(a, b)| *a == b));
    }

    #[test]
    fn test_search_is_case_insensitive() {
        let docs = seed_documents();
        assert_eq!(
            titles(&filter_documents(&docs, "Q3", FilterCategory::All)),
            vec!["Q3 Pazarlama Raporu"]
        );
        assert_eq!(
            titles(&filter_documents(&docs, "acme", FilterCategory::All)),
            vec!["Proje Teklifi - Acme"]
        );
    }

    #[test]
    fn test_category_predicates() {
        let docs = seed_documents();
        let folders = filter_documents(&docs, "", FilterCategory::Folder);
        assert_eq!(folders.len(), 1);
        assert_eq!(folders[0].id, "3");

        let shared = filter_documents(&docs, "", FilterCategory::Shared);
        assert_eq!(shared.iter().map(|d| d.id.as_str()).collect::<Vec<_>>(), vec!["1", "3"]);
    }

    #[test]
    fn test_predicates_are_anded() {
        let docs = seed_documents();
        assert!(filter_documents(&docs, "Q3", FilterCategory::Folder).is_empty());
        assert_eq!(filter_documents(&docs, "marka", FilterCategory::Shared).len(), 1);
        assert!(filter_documents(&docs, "zzz", FilterCategory::All).is_empty());
    }
}
