use std::fmt::{self, Debug, Display};

use skipkv_error::IndexError;

use super::{HeightSource, SkipListStatistics, ValidationError};
use crate::validate;

/// Максимальная высота башни по умолчанию.
pub const DEFAULT_MAX_HEIGHT: usize = 16;

/// Индекс ячейки в арене узлов.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// Ячейка головы: служебная башня без полезных данных.
const HEAD: NodeId = NodeId(0);

type Link = Option<NodeId>;

/// Узел пропускного списка.
///
/// `forward[i]` - следующий узел на уровне `i`; длина `forward` и есть
/// высота башни. У головы `entry == None`, у свободной ячейки арены тоже
/// `None` и пустой `forward`.
#[derive(Debug, Clone)]
struct Node<K, V> {
    entry: Option<(K, V)>,
    forward: Vec<Link>,
}

/// Исход вставки.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertStatus {
    /// Ключ добавлен
    Inserted,
    /// Ключ уже был в списке, значение не тронуто
    AlreadyExists,
}

/// Исход удаления.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStatus {
    /// Ключ удалён
    Deleted,
    /// Ключа не было
    NotFound,
}

/// SkipList - арена узлов с головой в нулевой ячейке, текущей высотой и
/// количеством элементов.
#[derive(Debug, Clone)]
pub struct SkipList<K, V> {
    nodes: Vec<Node<K, V>>,
    free: Vec<NodeId>,
    max_height: usize,
    current_height: usize,
    length: usize,
    heights: HeightSource,
}

/// Итератор по одному уровню в порядке возрастания ключа.
pub struct LevelIter<'a, K, V> {
    list: &'a SkipList<K, V>,
    level: usize,
    current: Link,
}

/// Итератор по диапазону `[start, end)` на нулевом уровне.
pub struct RangeIter<'a, K, V> {
    inner: LevelIter<'a, K, V>,
    end: &'a K,
}

////////////////////////////////////////////////////////////////////////////////
// Собственные методы
////////////////////////////////////////////////////////////////////////////////

impl InsertStatus {
    pub fn is_inserted(self) -> bool {
        self == Self::Inserted
    }

    /// Превращает статус в `Result` для проброса через `?`.
    pub fn into_result(
        self,
        key: impl ToString,
    ) -> Result<(), IndexError> {
        match self {
            Self::Inserted => Ok(()),
            Self::AlreadyExists => Err(IndexError::KeyExists {
                key: key.to_string(),
            }),
        }
    }
}

impl DeleteStatus {
    pub fn is_deleted(self) -> bool {
        self == Self::Deleted
    }

    /// Превращает статус в `Result` для проброса через `?`.
    pub fn into_result(
        self,
        key: impl ToString,
    ) -> Result<(), IndexError> {
        match self {
            Self::Deleted => Ok(()),
            Self::NotFound => Err(IndexError::KeyNotFound {
                key: key.to_string(),
            }),
        }
    }
}

impl<V> From<Option<V>> for DeleteStatus {
    fn from(removed: Option<V>) -> Self {
        match removed {
            Some(_) => Self::Deleted,
            None => Self::NotFound,
        }
    }
}

impl<K, V> SkipList<K, V>
where
    K: Ord,
{
    /// Создаёт пустой список с заданной максимальной высотой башни.
    ///
    /// # Panics
    ///
    /// Паникует, если `max_height == 0`. Для проверяемого варианта см.
    /// [`SkipList::try_new`].
    pub fn new(max_height: usize) -> Self {
        assert!(max_height >= 1, "max_height must be at least 1");
        Self::with_source(max_height, HeightSource::ThreadLocal)
    }

    /// Как [`SkipList::new`], но возвращает ошибку вместо паники.
    pub fn try_new(max_height: usize) -> Result<Self, IndexError> {
        if max_height == 0 {
            return Err(IndexError::InvalidMaxHeight { value: max_height });
        }

        Ok(Self::with_source(max_height, HeightSource::ThreadLocal))
    }

    /// Создаёт список с собственным детерминированным генератором высоты.
    ///
    /// # Panics
    ///
    /// Паникует, если `max_height == 0`.
    pub fn with_seed(
        max_height: usize,
        seed: u64,
    ) -> Self {
        assert!(max_height >= 1, "max_height must be at least 1");
        Self::with_source(max_height, HeightSource::seeded(seed))
    }

    pub(crate) fn with_source(
        max_height: usize,
        heights: HeightSource,
    ) -> Self {
        let head = Node {
            entry: None,
            forward: vec![None; max_height],
        };

        Self {
            nodes: vec![head],
            free: Vec::new(),
            max_height,
            current_height: 1,
            length: 0,
            heights,
        }
    }

    #[inline(always)]
    fn next(
        &self,
        id: NodeId,
        level: usize,
    ) -> Link {
        self.nodes[id.0].forward[level]
    }

    /// Ключ живого узла. Ссылки никогда не ведут на голову или свободную
    /// ячейку, поэтому `None` здесь означает порчу структуры.
    #[inline(always)]
    fn key_of(
        &self,
        id: NodeId,
    ) -> &K {
        match &self.nodes[id.0].entry {
            Some((key, _)) => key,
            None => unreachable!("link points to vacant slot {id:?}"),
        }
    }

    /// Спуск от головы: последний узел с ключом меньше `key` на нулевом
    /// уровне.
    fn find_predecessor(
        &self,
        key: &K,
    ) -> NodeId {
        let mut current = HEAD;

        for level in (0..self.current_height).rev() {
            while let Some(next) = self.next(current, level) {
                if self.key_of(next) < key {
                    current = next;
                } else {
                    break;
                }
            }
        }

        current
    }

    /// Поиск предшествующих узлов для каждого уровня: `update[i]` - узел,
    /// после которого на уровне `i` встаёт (или стоит) башня с ключом `key`.
    /// Уровни выше текущей высоты указывают на голову.
    fn find_update(
        &self,
        key: &K,
    ) -> Vec<NodeId> {
        let mut update = vec![HEAD; self.max_height];
        let mut current = HEAD;

        for level in (0..self.current_height).rev() {
            while let Some(next) = self.next(current, level) {
                if self.key_of(next) < key {
                    current = next;
                } else {
                    break;
                }
            }
            update[level] = current;
        }

        update
    }

    fn allocate(
        &mut self,
        key: K,
        value: V,
        height: usize,
    ) -> NodeId {
        let node = Node {
            entry: Some((key, value)),
            forward: vec![None; height],
        };

        match self.free.pop() {
            Some(id) => {
                self.nodes[id.0] = node;
                id
            }
            None => {
                self.nodes.push(node);
                NodeId(self.nodes.len() - 1)
            }
        }
    }

    fn release(
        &mut self,
        id: NodeId,
    ) -> Option<(K, V)> {
        let node = &mut self.nodes[id.0];
        let entry = node.entry.take();

        node.forward = Vec::new();
        self.free.push(id);

        entry
    }

    /// Вставляет ключ и значение. Существующий ключ не перезаписывается.
    pub fn insert(
        &mut self,
        key: K,
        value: V,
    ) -> InsertStatus {
        let update = self.find_update(&key);

        if let Some(next) = self.next(update[0], 0) {
            if *self.key_of(next) == key {
                return InsertStatus::AlreadyExists;
            }
        }

        let height = self.heights.next_height(self.max_height);

        // update[current_height..height] уже указывают на голову.
        if height > self.current_height {
            self.current_height = height;
        }

        let id = self.allocate(key, value, height);

        for (level, &prev) in update.iter().enumerate().take(height) {
            self.nodes[id.0].forward[level] = self.nodes[prev.0].forward[level];
            self.nodes[prev.0].forward[level] = Some(id);
        }

        self.length += 1;

        InsertStatus::Inserted
    }

    /// Ищет узел с заданным ключом и возвращает ссылку на значение, если
    /// найден.
    pub fn search(
        &self,
        key: &K,
    ) -> Option<&V> {
        let candidate = self.next(self.find_predecessor(key), 0)?;

        match &self.nodes[candidate.0].entry {
            Some((k, v)) if k == key => Some(v),
            _ => None,
        }
    }

    /// Удаляет узел с заданным ключом и возвращает его значение.
    pub fn remove(
        &mut self,
        key: &K,
    ) -> Option<V> {
        let update = self.find_update(key);
        let target = self.next(update[0], 0)?;

        if self.key_of(target) != key {
            return None;
        }

        let height = self.nodes[target.0].forward.len();

        for (level, &prev) in update.iter().enumerate().take(height) {
            assert_eq!(
                self.next(prev, level),
                Some(target),
                "tower {target:?} is not linked at level {level}"
            );
            self.nodes[prev.0].forward[level] = self.nodes[target.0].forward[level];
        }

        while self.current_height > 1 && self.next(HEAD, self.current_height - 1).is_none() {
            self.current_height -= 1;
        }

        self.length -= 1;

        self.release(target).map(|(_, value)| value)
    }

    /// Проверяет, содержится ли ключ в списке.
    pub fn contains(
        &self,
        key: &K,
    ) -> bool {
        self.search(key).is_some()
    }

    /// Возвращает текущее число элементов в списке.
    pub fn len(&self) -> usize {
        self.length
    }

    /// Проверяет на пустоту.
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// Максимальная высота башни, заданная при создании.
    pub fn max_height(&self) -> usize {
        self.max_height
    }

    /// Наибольшая высота среди присутствующих башен (не меньше 1).
    pub fn current_height(&self) -> usize {
        self.current_height
    }

    /// Возвращает итератор по (&K, &V) в порядке возрастания ключа.
    pub fn iter(&self) -> LevelIter<'_, K, V> {
        self.level_iter(0)
    }

    /// Итератор по цепочке уровня `level`. Уровни выше текущей высоты пусты.
    pub fn level_iter(
        &self,
        level: usize,
    ) -> LevelIter<'_, K, V> {
        let current = if level < self.max_height {
            self.next(HEAD, level)
        } else {
            None
        };

        LevelIter {
            list: self,
            level,
            current,
        }
    }

    /// Все занятые уровни сверху вниз.
    pub fn levels(&self) -> impl Iterator<Item = (usize, LevelIter<'_, K, V>)> + '_ {
        (0..self.current_height)
            .rev()
            .map(move |level| (level, self.level_iter(level)))
    }

    /// Возвращает итератор по диапазону: от ключа `start` до ключа `end` (не
    /// включая end).
    pub fn range<'a>(
        &'a self,
        start: &K,
        end: &'a K,
    ) -> RangeIter<'a, K, V> {
        let current = self.next(self.find_predecessor(start), 0);

        RangeIter {
            inner: LevelIter {
                list: self,
                level: 0,
                current,
            },
            end,
        }
    }

    /// Возвращает первый элемент (минимальный ключ) списка.
    pub fn first(&self) -> Option<(&K, &V)> {
        self.iter().next()
    }

    /// Возвращает последний элемент (максимальный ключ) списка.
    pub fn last(&self) -> Option<(&K, &V)> {
        let mut current = HEAD;

        for level in (0..self.current_height).rev() {
            while let Some(next) = self.next(current, level) {
                current = next;
            }
        }

        self.nodes[current.0].entry.as_ref().map(|(k, v)| (k, v))
    }

    /// Удаляет все элементы из списка.
    pub fn clear(&mut self) {
        self.nodes.truncate(1);
        self.nodes[HEAD.0].forward.fill(None);
        self.free.clear();
        self.current_height = 1;
        self.length = 0;
    }

    /// Собирает статистику распределения высот.
    pub fn statistics(&self) -> SkipListStatistics {
        let mut stats = SkipListStatistics::empty(self.max_height);

        for id in self.tower_ids(0) {
            let height = self.nodes[id.0].forward.len();
            stats.height_distribution[height - 1] += 1;
            stats.node_count += 1;
        }

        stats.current_height = self.current_height;
        stats.compute_average_height();

        stats
    }

    fn tower_ids(
        &self,
        level: usize,
    ) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.next(HEAD, level), move |&id| self.next(id, level))
    }

    /// Проверяет структурные инварианты:
    /// - каждый уровень строго упорядочен;
    /// - башня высоты `h` связана ровно на уровнях `0..h`;
    /// - длина совпадает с нулевым уровнем;
    /// - текущая высота равна наибольшей присутствующей, уровни выше пусты.
    pub fn validate_invariants(&self) -> Result<(), ValidationError>
    where
        K: Debug,
    {
        let limit = self.nodes.len();
        let mut tallest = 1;
        let mut expected_population = vec![0usize; self.max_height];

        for level in 0..self.max_height {
            let mut population = 0usize;
            let mut prev: Option<&K> = None;
            let mut cursor = self.next(HEAD, level);

            while let Some(id) = cursor {
                population += 1;

                validate!(
                    population <= limit,
                    ValidationError::CyclicReference { level }
                );

                let node = &self.nodes[id.0];
                let height = node.forward.len();

                validate!(
                    (1..=self.max_height).contains(&height),
                    ValidationError::InvalidHeight {
                        node_height: height,
                        max_height: self.max_height
                    }
                );

                validate!(
                    level < height,
                    ValidationError::TornTower {
                        level,
                        message: format!("{:?} has height {height}", self.key_of(id))
                    }
                );

                let key = self.key_of(id);

                if let Some(prev) = prev {
                    validate!(
                        prev < key,
                        ValidationError::SortOrderViolation {
                            level,
                            message: format!("{prev:?} >= {key:?}")
                        }
                    );
                }

                prev = Some(key);

                if level == 0 {
                    tallest = tallest.max(height);
                    for slot in expected_population.iter_mut().take(height) {
                        *slot += 1;
                    }
                }

                cursor = node.forward[level];
            }

            if level == 0 {
                validate!(
                    population == self.length,
                    ValidationError::LengthMismatch {
                        expected: self.length,
                        actual: population
                    }
                );
            }

            validate!(
                population == expected_population[level],
                ValidationError::TornTower {
                    level,
                    message: format!(
                        "{} towers reach this level, {population} are linked",
                        expected_population[level]
                    )
                }
            );
        }

        validate!(
            self.current_height == tallest,
            ValidationError::HeightMismatch {
                current: self.current_height,
                actual: tallest
            }
        );

        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Общие реализации трейтов для SkipList
////////////////////////////////////////////////////////////////////////////////

impl<K: Ord, V> Default for SkipList<K, V> {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HEIGHT)
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a SkipList<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = LevelIter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V> Iterator for LevelIter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let list = self.list;
        let node = &list.nodes[self.current?.0];

        self.current = node.forward[self.level];

        node.entry.as_ref().map(|(k, v)| (k, v))
    }
}

impl<'a, K, V> Iterator for RangeIter<'a, K, V>
where
    K: Ord,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let (key, value) = self.inner.next()?;

        if key >= self.end {
            self.inner.current = None;
            return None;
        }

        Some((key, value))
    }
}

/// Отображение по уровням сверху вниз: `Level i: k:v -> k:v`.
impl<K, V> Display for SkipList<K, V>
where
    K: Ord + Display,
    V: Display,
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for (level, entries) in self.levels() {
            write!(f, "Level {level}: ")?;

            for (i, (key, value)) in entries.enumerate() {
                if i > 0 {
                    write!(f, " -> ")?;
                }
                write!(f, "{key}:{value}")?;
            }

            writeln!(f)?;
        }

        Ok(())
    }
}

impl<K, V> PartialEq for SkipList<K, V>
where
    K: Ord,
    V: PartialEq,
{
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

////////////////////////////////////////////////////////////////////////////////
// Тесты
////////////////////////////////////////////////////////////////////////////////
