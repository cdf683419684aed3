//! Section tree construction
//!
//! Nests a flat, depth-tagged heading list into an outline: each heading
//! becomes a child of the nearest preceding heading with a strictly smaller
//! depth. Depth gaps are kept as-is (no intermediate levels are invented).

use super::heading::Heading;
use serde::Serialize;
use std::collections::HashMap;

/// A heading together with the headings nested under it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    /// Heading title
    pub title: String,
    /// Unique heading id
    pub id: String,
    /// Heading depth
    pub depth: u8,
    /// Nested sections in document order
    pub children: Vec<Section>,
}

impl Section {
    fn leaf(heading: &Heading) -> Self {
        Self {
            title: heading.title.clone(),
            id: heading.id.clone(),
            depth: heading.depth,
            children: Vec::new(),
        }
    }

    /// Number of sections in this subtree, including this one
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Section::subtree_len).sum::<usize>()
    }

    /// Depth-first, pre-order iterator over this subtree
    pub fn iter(&self) -> SectionIter<'_> {
        SectionIter { stack: vec![self] }
    }
}

/// Depth-first iterator over a section forest
pub struct SectionIter<'a> {
    stack: Vec<&'a Section>,
}

impl<'a> Iterator for SectionIter<'a> {
    type Item = &'a Section;

    fn next(&mut self) -> Option<Self::Item> {
        let section = self.stack.pop()?;
        self.stack.extend(section.children.iter().rev());
        Some(section)
    }
}

/// Iterate over every section of a forest in document order
pub fn walk(forest: &[Section]) -> SectionIter<'_> {
    SectionIter {
        stack: forest.iter().rev().collect(),
    }
}

/// Map from section id to the ids of its ancestors (root first)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AncestorMap {
    chains: HashMap<String, Vec<String>>,
}

impl AncestorMap {
    /// Build the ancestor map of a section forest
    pub fn from_forest(forest: &[Section]) -> Self {
        let mut chains = HashMap::new();
        let mut path: Vec<String> = Vec::new();
        for root in forest {
            Self::collect(root, &mut path, &mut chains);
        }
        Self { chains }
    }

    fn collect(section: &Section, path: &mut Vec<String>, chains: &mut HashMap<String, Vec<String>>) {
        chains.insert(section.id.clone(), path.clone());
        path.push(section.id.clone());
        for child in &section.children {
            Self::collect(child, path, chains);
        }
        path.pop();
    }

    /// Ancestor ids of `id`, root first; `None` for unknown ids
    pub fn get(&self, id: &str) -> Option<&[String]> {
        self.chains.get(id).map(Vec::as_slice)
    }

    /// Ancestor ids of `id`, or an empty list for unknown ids
    pub fn ancestors_of(&self, id: &str) -> Vec<String> {
        self.get(id).map(<[String]>::to_vec).unwrap_or_default()
    }

    /// Number of ids in the map
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    /// Whether the map has no entries
    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }
}

/// Node on the builder stack: the virtual root or a path into the forest
struct StackEntry {
    depth: u8,
    /// Child indices from the forest root to this node (empty for the virtual root)
    path: Vec<usize>,
}

/// Nest headings into a section forest
pub fn build_section_tree(headings: &[Heading]) -> Vec<Section> {
    let mut forest: Vec<Section> = Vec::new();
    let mut stack = vec![StackEntry {
        depth: 0,
        path: Vec::new(),
    }];

    for heading in headings {
        while stack.last().is_some_and(|top| top.depth >= heading.depth) {
            stack.pop();
        }

        // The virtual root has depth 0 and headings are at least depth 1,
        // so it is never popped.
        let parent_path = stack.last().map(|top| top.path.clone()).unwrap_or_default();
        let siblings = children_at(&mut forest, &parent_path);
        siblings.push(Section::leaf(heading));

        let mut path = parent_path;
        path.push(siblings.len() - 1);
        stack.push(StackEntry {
            depth: heading.depth,
            path,
        });
    }

    forest
}

/// Resolve the child list of the node at `path` (the forest itself for `[]`)
fn children_at<'a>(forest: &'a mut Vec<Section>, path: &[usize]) -> &'a mut Vec<Section> {
    let mut children = forest;
    for &index in path {
        children = &mut children[index].children;
    }
    children
}

/// Nest headings and derive the ancestor map in one step
pub fn build_outline(headings: &[Heading]) -> (Vec<Section>, AncestorMap) {
    let forest = build_section_tree(headings);
    let ancestors = AncestorMap::from_forest(&forest);
    (forest, ancestors)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(id: &str, depth: u8) -> Heading {
        Heading::new(id.to_uppercase(), id, depth)
    }

    fn shape(forest: &[Section]) -> String {
        forest
            .iter()
            .map(|s| {
                if s.children.is_empty() {
                    s.id.clone()
                } else {
                    format!("{}({})", s.id, shape(&s.children))
                }
            })
            .collect::<Vec<_>>()
            .join(",")
    }

    #[test]
    fn test_build_empty() {
        let (forest, ancestors) = build_outline(&[]);
        assert!(forest.is_empty());
        assert!(ancestors.is_empty());
    }

    #[test]
    fn test_build_nested() {
        let headings = vec![h("a", 1), h("b", 2), h("c", 3), h("d", 2), h("e", 1)];

        let forest = build_section_tree(&headings);

        assert_eq!(shape(&forest), "a(b(c),d),e");
    }

    #[test]
    fn test_build_siblings_at_equal_depth() {
        let headings = vec![h("a", 2), h("b", 2), h("c", 2)];

        let forest = build_section_tree(&headings);

        assert_eq!(shape(&forest), "a,b,c");
    }

    #[test]
    fn test_build_depth_gap_is_not_filled() {
        // h1 followed directly by h4, then back to h2
        let headings = vec![h("a", 1), h("b", 4), h("c", 2), h("d", 3)];

        let forest = build_section_tree(&headings);

        assert_eq!(shape(&forest), "a(b,c(d))");
        assert_eq!(forest[0].children[0].depth, 4);
    }

    #[test]
    fn test_build_document_starting_deep() {
        // First heading deeper than a later one
        let headings = vec![h("a", 3), h("b", 2), h("c", 3)];

        let forest = build_section_tree(&headings);

        assert_eq!(shape(&forest), "a,b(c)");
    }

    #[test]
    fn test_children_are_strictly_deeper_and_order_is_preserved() {
        let headings = vec![
            h("a", 2),
            h("b", 4),
            h("c", 3),
            h("d", 6),
            h("e", 1),
            h("f", 5),
            h("g", 5),
            h("i", 2),
        ];

        let forest = build_section_tree(&headings);

        fn check(section: &Section) {
            for child in &section.children {
                assert!(child.depth > section.depth);
                check(child);
            }
        }
        forest.iter().for_each(check);

        let order: Vec<&str> = walk(&forest).map(|s| s.id.as_str()).collect();
        let expected: Vec<&str> = headings.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(order, expected);
    }

    #[test]
    fn test_ancestor_map() {
        let headings = vec![h("a", 1), h("b", 2), h("c", 3), h("d", 2), h("e", 1)];

        let (_, ancestors) = build_outline(&headings);

        assert_eq!(ancestors.len(), 5);
        assert_eq!(ancestors.ancestors_of("a"), Vec::<String>::new());
        assert_eq!(ancestors.ancestors_of("c"), vec!["a", "b"]);
        assert_eq!(ancestors.ancestors_of("d"), vec!["a"]);
        assert_eq!(ancestors.ancestors_of("e"), Vec::<String>::new());
        assert!(ancestors.get("missing").is_none());
    }

    #[test]
    fn test_section_len_and_iter() {
        let forest = build_section_tree(&[h("a", 1), h("b", 2), h("c", 2)]);

        assert_eq!(forest[0].subtree_len(), 3);
        let ids: Vec<&str> = forest[0].iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
