//! Rule shapes as they appear in configuration files.
//!
//! Both the category map and the subcategory tree are order-sensitive: the
//! first declared category wins when several match, and the pre-order walk of
//! the tree decides tie-breaks. [`OrderedMap`] keeps entries in file order
//! instead of relying on a hash or sorted map.

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::{SerializeMap, SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;

/// A string-keyed map that preserves declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedMap<V> {
    entries: Vec<(String, V)>,
}

impl<V> Default for OrderedMap<V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<V> OrderedMap<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, replacing an existing entry in place.
    pub fn insert(&mut self, key: impl Into<String>, value: V) {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, value: V) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates entries in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for OrderedMap<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = OrderedMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

impl<V: Serialize> Serialize for OrderedMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for OrderedMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OrderedMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
            type Value = OrderedMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map")
            }

            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(OrderedMap::new())
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut map = OrderedMap::new();
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    map.insert(key, value);
                }
                Ok(map)
            }
        }

        deserializer.deserialize_map(OrderedMapVisitor(PhantomData))
    }
}

/// Category tag to main folder, in declaration order.
pub type CategoryRules = OrderedMap<String>;

/// Category tag to its subcategory tree, in declaration order.
pub type SubcategoryRules = OrderedMap<RuleNode>;

/// One node of the subcategory rule tree.
///
/// Configuration files mix three shapes freely:
///
/// ```yaml
/// lore:                 # Branch: label -> children
///   characters:         # Branch
///     - npc             # Sequence of Leafs
///     - pc
///   locations: [city]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleNode {
    /// Siblings at the current path. Adds no path segment of its own.
    Sequence(Vec<RuleNode>),
    /// Labels that each become a path segment before descending into children.
    Branch(Vec<(String, RuleNode)>),
    /// A label filed at the current path. Leaves get no folder of their own.
    Leaf(String),
}

impl RuleNode {
    pub fn leaf(label: impl Into<String>) -> Self {
        RuleNode::Leaf(label.into())
    }

    /// A sequence of leaves, the common `[a, b, c]` case.
    pub fn leaves<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RuleNode::Sequence(labels.into_iter().map(RuleNode::leaf).collect())
    }

    /// A single-label branch.
    pub fn branch(label: impl Into<String>, children: RuleNode) -> Self {
        RuleNode::Branch(vec![(label.into(), children)])
    }

    /// Visits every label in pre-order, passing the labels of its ancestors
    /// within this node (not including the label itself) and whether the
    /// label is a bare leaf.
    pub fn walk<'a, F>(&'a self, ancestors: &mut Vec<&'a str>, visit: &mut F)
    where
        F: FnMut(&[&'a str], &'a str, bool),
    {
        match self {
            RuleNode::Sequence(children) => {
                for child in children {
                    child.walk(ancestors, visit);
                }
            }
            RuleNode::Branch(entries) => {
                for (label, children) in entries {
                    visit(ancestors, label, false);
                    ancestors.push(label);
                    children.walk(ancestors, visit);
                    ancestors.pop();
                }
            }
            RuleNode::Leaf(label) => visit(ancestors, label, true),
        }
    }
}

impl Serialize for RuleNode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RuleNode::Leaf(label) => serializer.serialize_str(label),
            RuleNode::Sequence(children) => {
                let mut seq = serializer.serialize_seq(Some(children.len()))?;
                for child in children {
                    seq.serialize_element(child)?;
                }
                seq.end()
            }
            RuleNode::Branch(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (label, children) in entries {
                    map.serialize_entry(label, children)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for RuleNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RuleNodeVisitor;

        impl<'de> Visitor<'de> for RuleNodeVisitor {
            type Value = RuleNode;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a tag label, a list of rule nodes, or a map of label to rule nodes")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
                Ok(RuleNode::Leaf(v.to_string()))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<Self::Value, E> {
                Ok(RuleNode::Leaf(v))
            }

            // A label with no children (`characters:` in YAML) carries nothing to walk.
            fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(RuleNode::Sequence(Vec::new()))
            }

            fn visit_none<E: de::Error>(self) -> Result<Self::Value, E> {
                Ok(RuleNode::Sequence(Vec::new()))
            }

            fn visit_bool<E: de::Error>(self, _: bool) -> Result<Self::Value, E> {
                Ok(RuleNode::Sequence(Vec::new()))
            }

            fn visit_i64<E: de::Error>(self, _: i64) -> Result<Self::Value, E> {
                Ok(RuleNode::Sequence(Vec::new()))
            }

            fn visit_u64<E: de::Error>(self, _: u64) -> Result<Self::Value, E> {
                Ok(RuleNode::Sequence(Vec::new()))
            }

            fn visit_f64<E: de::Error>(self, _: f64) -> Result<Self::Value, E> {
                Ok(RuleNode::Sequence(Vec::new()))
            }

            fn visit_seq<A: SeqAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut children = Vec::new();
                while let Some(child) = access.next_element::<RuleNode>()? {
                    children.push(child);
                }
                Ok(RuleNode::Sequence(children))
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::new();
                while let Some((label, children)) = access.next_entry::<String, RuleNode>()? {
                    entries.push((label, children));
                }
                Ok(RuleNode::Branch(entries))
            }
        }

        deserializer.deserialize_any(RuleNodeVisitor)
    }
}
