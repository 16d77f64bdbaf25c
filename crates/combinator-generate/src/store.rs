use combinator_core::Variation;

/// Which groups a read returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupFilter {
    /// Every group.
    All,
    /// One group's list, empty when the group does not exist.
    One(String),
    /// The listed groups that exist; missing names are left out.
    Many(Vec<String>),
}

impl From<&str> for GroupFilter {
    fn from(name: &str) -> Self {
        GroupFilter::One(name.to_string())
    }
}

impl From<String> for GroupFilter {
    fn from(name: String) -> Self {
        GroupFilter::One(name)
    }
}

impl From<Vec<String>> for GroupFilter {
    fn from(names: Vec<String>) -> Self {
        GroupFilter::Many(names)
    }
}

impl From<&[&str]> for GroupFilter {
    fn from(names: &[&str]) -> Self {
        GroupFilter::Many(names.iter().map(|name| name.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for GroupFilter {
    fn from(names: [&str; N]) -> Self {
        GroupFilter::Many(names.iter().map(|name| name.to_string()).collect())
    }
}

impl<T: Into<GroupFilter>> From<Option<T>> for GroupFilter {
    fn from(filter: Option<T>) -> Self {
        filter.map(Into::into).unwrap_or(GroupFilter::All)
    }
}

/// Group name and its stored variations, in first-write order.
pub type GroupEntries<'a> = Vec<(&'a str, &'a [Variation])>;

/// Result of [`GroupStore::read`].
#[derive(Debug, Clone, PartialEq)]
pub enum GroupView<'a> {
    Groups(GroupEntries<'a>),
    Group(&'a [Variation]),
}

impl<'a> GroupView<'a> {
    /// The single group's variations, for a `GroupFilter::One` read.
    pub fn as_group(&self) -> Option<&'a [Variation]> {
        match self {
            GroupView::Group(items) => Some(*items),
            GroupView::Groups(_) => None,
        }
    }

    /// The group entries, for `GroupFilter::All` and `GroupFilter::Many` reads.
    pub fn as_groups(&self) -> Option<&[(&'a str, &'a [Variation])]> {
        match self {
            GroupView::Groups(groups) => Some(groups.as_slice()),
            GroupView::Group(_) => None,
        }
    }
}

/// Named, append-only lists of variations, kept in the order groups were
/// first written.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupStore {
    groups: Vec<(String, Vec<Variation>)>,
}

impl GroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `variations` to each named group, creating groups on first
    /// write. A name listed twice receives the variations twice.
    pub fn append<S: AsRef<str>>(&mut self, groups: &[S], variations: &[Variation]) {
        for group in groups {
            let name = group.as_ref();
            match self.groups.iter_mut().find(|(existing, _)| existing == name) {
                Some((_, items)) => items.extend_from_slice(variations),
                None => self.groups.push((name.to_string(), variations.to_vec())),
            }
        }
    }

    /// Clear one group, or every group when `group` is `None`. A cleared
    /// group moves to the end when written again.
    pub fn reset(&mut self, group: Option<&str>) {
        match group {
            Some(name) => self.groups.retain(|(existing, _)| existing != name),
            None => self.groups.clear(),
        }
    }

    /// Variations stored under `name`; empty when the group does not exist.
    pub fn group(&self, name: &str) -> &[Variation] {
        self.groups
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, items)| items.as_slice())
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.groups.iter().any(|(existing, _)| existing == name)
    }

    /// Every group in first-write order.
    pub fn groups(&self) -> GroupEntries<'_> {
        self.groups
            .iter()
            .map(|(name, items)| (name.as_str(), items.as_slice()))
            .collect()
    }

    /// Stored groups whose names appear in `names`, in store order. Missing
    /// names are skipped.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> GroupEntries<'_> {
        self.groups
            .iter()
            .filter(|(existing, _)| names.iter().any(|name| name.as_ref() == existing))
            .map(|(name, items)| (name.as_str(), items.as_slice()))
            .collect()
    }

    pub fn read(&self, filter: &GroupFilter) -> GroupView<'_> {
        match filter {
            GroupFilter::All => GroupView::Groups(self.groups()),
            GroupFilter::One(name) => GroupView::Group(self.group(name)),
            GroupFilter::Many(names) => GroupView::Groups(self.select(names.as_slice())),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
