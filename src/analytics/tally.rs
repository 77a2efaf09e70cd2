//! 计数器与分桶集合
//!
//! 首次访问即为零值的映射类型。每个工作线程持有自己的实例，
//! 合并时计数相加、集合取并集，结果与合并顺序无关。

use std::borrow::Borrow;
use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// 键到计数的映射，未出现的键计数为 0
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally<K: Eq + Hash> {
    counts: HashMap<K, u64>,
}

impl<K: Eq + Hash> Default for Tally<K> {
    fn default() -> Self {
        Self { counts: HashMap::new() }
    }
}

impl<K: Eq + Hash> Tally<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn increment(&mut self, key: K) {
        self.add(key, 1);
    }

    pub fn add(&mut self, key: K, n: u64) {
        *self.counts.entry(key).or_insert(0) += n;
    }

    pub fn get<Q>(&self, key: &Q) -> u64
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// 不同键的数量
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// 所有计数之和
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, u64)> {
        self.counts.iter().map(|(k, n)| (k, *n))
    }

    /// 合并另一个计数器：同键相加，独有的键原样保留
    pub fn merge(&mut self, other: Tally<K>) {
        for (key, n) in other.counts {
            self.add(key, n);
        }
    }

    /// 按计数降序排列，计数相同按键升序
    pub fn ranked(&self) -> Vec<(K, u64)>
    where
        K: Ord + Clone,
    {
        let mut entries: Vec<(K, u64)> =
            self.counts.iter().map(|(k, n)| (k.clone(), *n)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries
    }
}

impl<K: Eq + Hash> FromIterator<(K, u64)> for Tally<K> {
    fn from_iter<I: IntoIterator<Item = (K, u64)>>(iter: I) -> Self {
        let mut tally = Self::new();
        for (key, n) in iter {
            tally.add(key, n);
        }
        tally
    }
}

/// 分桶集合：桶键到值集合的映射，用于按天去重
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BucketSet<K: Eq + Hash, V: Eq + Hash> {
    buckets: HashMap<K, HashSet<V>>,
}

impl<K: Eq + Hash, V: Eq + Hash> Default for BucketSet<K, V> {
    fn default() -> Self {
        Self { buckets: HashMap::new() }
    }
}

impl<K: Eq + Hash, V: Eq + Hash> BucketSet<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 插入值，返回该值在桶中是否为新值
    pub fn insert(&mut self, key: K, value: V) -> bool {
        self.buckets.entry(key).or_default().insert(value)
    }

    /// 桶中不同值的数量，桶不存在时为 0
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.buckets.get(key).map_or(0, HashSet::len)
    }

    pub fn contains<Q>(&self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.buckets.get(key).is_some_and(|set| set.contains(value))
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.buckets.keys()
    }

    /// 合并另一个分桶集合：同桶取并集
    pub fn merge(&mut self, other: BucketSet<K, V>) {
        for (key, values) in other.buckets {
            self.buckets.entry(key).or_default().extend(values);
        }
    }
}
