//! The two regions whose automation logs feed a report.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// One of the two independently logged automation environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    /// The `arkcn` environment.
    Cn,
    /// The `arkjp` environment.
    Jp,
}

impl Region {
    /// Every region, in report order.
    pub const ALL: [Region; 2] = [Region::Cn, Region::Jp];

    /// Short label used in prompts, logs and report columns.
    pub fn label(self) -> &'static str {
        match self {
            Region::Cn => "arkcn",
            Region::Jp => "arkjp",
        }
    }

    /// Name of the table holding this region's log rows.
    pub fn log_table(self) -> &'static str {
        match self {
            Region::Cn => "arkcn_logs",
            Region::Jp => "arkjp_logs",
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A fixed-size mapping from [`Region`] to `T`.
///
/// Every region always has a slot, so per-region logic can be written once
/// and applied by iterating [`Region::ALL`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerRegion<T> {
    pub cn: T,
    pub jp: T,
}

impl<T> PerRegion<T> {
    pub fn new(cn: T, jp: T) -> Self {
        Self { cn, jp }
    }

    /// Build a mapping by calling `f` once per region, in [`Region::ALL`] order.
    pub fn from_fn(mut f: impl FnMut(Region) -> T) -> Self {
        let cn = f(Region::Cn);
        let jp = f(Region::Jp);
        Self { cn, jp }
    }

    pub fn get(&self, region: Region) -> &T {
        match region {
            Region::Cn => &self.cn,
            Region::Jp => &self.jp,
        }
    }

    pub fn get_mut(&mut self, region: Region) -> &mut T {
        match region {
            Region::Cn => &mut self.cn,
            Region::Jp => &mut self.jp,
        }
    }

    /// Iterate `(region, value)` pairs in [`Region::ALL`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Region, &T)> {
        Region::ALL.into_iter().map(move |r| (r, self.get(r)))
    }

    pub fn map<U>(self, mut f: impl FnMut(Region, T) -> U) -> PerRegion<U> {
        PerRegion {
            cn: f(Region::Cn, self.cn),
            jp: f(Region::Jp, self.jp),
        }
    }

    pub fn as_ref(&self) -> PerRegion<&T> {
        PerRegion {
            cn: &self.cn,
            jp: &self.jp,
        }
    }
}

impl<T> PerRegion<Option<T>> {
    /// `Some` only if every region has a value.
    pub fn transpose(self) -> Option<PerRegion<T>> {
        Some(PerRegion {
            cn: self.cn?,
            jp: self.jp?,
        })
    }

    /// Regions whose slot is empty, in [`Region::ALL`] order.
    pub fn missing(&self) -> Vec<Region> {
        self.iter()
            .filter(|(_, v)| v.is_none())
            .map(|(r, _)| r)
            .collect()
    }
}

impl<T> Index<Region> for PerRegion<T> {
    type Output = T;

    fn index(&self, region: Region) -> &T {
        self.get(region)
    }
}

impl<T> IndexMut<Region> for PerRegion<T> {
    fn index_mut(&mut self, region: Region) -> &mut T {
        self.get_mut(region)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_and_tables() {
        assert_eq!(Region::Cn.label(), "arkcn");
        assert_eq!(Region::Jp.log_table(), "arkjp_logs");
        assert_eq!(Region::Jp.to_string(), "arkjp");
    }

    #[test]
    fn iter_follows_region_order() {
        let m = PerRegion::new("a", "b");
        let seen: Vec<_> = m.iter().map(|(r, v)| (r, *v)).collect();
        assert_eq!(seen, vec![(Region::Cn, "a"), (Region::Jp, "b")]);
    }

    #[test]
    fn index_and_index_mut() {
        let mut m = PerRegion::from_fn(|r| r.label().len());
        m[Region::Jp] += 1;
        assert_eq!(m[Region::Cn], 5);
        assert_eq!(m[Region::Jp], 6);
    }

    #[test]
    fn transpose_requires_every_region() {
        let full = PerRegion::new(Some(1), Some(2));
        assert_eq!(full.transpose(), Some(PerRegion::new(1, 2)));

        let partial: PerRegion<Option<i32>> = PerRegion::new(Some(1), None);
        assert_eq!(partial.missing(), vec![Region::Jp]);
        assert_eq!(partial.transpose(), None);
    }
}
