//! Генератор высоты башни.
//!
//! Высота тянется геометрическим процессом: начинаем с 1 и, пока выпадает
//! «орёл» и высота меньше максимальной, увеличиваем её. Отсюда
//! P(height >= k) = 2^-(k-1).

/// Источник случайных бит для высоты новой башни.
#[derive(Debug, Clone, Default)]
pub enum HeightSource {
    /// Потоко-локальный генератор `fastrand` вызывающего потока.
    #[default]
    ThreadLocal,
    /// Собственный генератор списка; детерминирован при заданном seed.
    Seeded(fastrand::Rng),
}

impl HeightSource {
    /// Создаёт детерминированный источник.
    pub fn seeded(seed: u64) -> Self {
        Self::Seeded(fastrand::Rng::with_seed(seed))
    }

    #[inline(always)]
    fn coin(&mut self) -> bool {
        match self {
            Self::ThreadLocal => fastrand::bool(),
            Self::Seeded(rng) => rng.bool(),
        }
    }

    /// Возвращает высоту в диапазоне `1..=max_height`.
    #[inline]
    pub fn next_height(
        &mut self,
        max_height: usize,
    ) -> usize {
        let mut height = 1;

        while height < max_height && self.coin() {
            height += 1;
        }

        height
    }
}

/// Переинициализирует генератор текущего потока. Нужен для воспроизводимых
/// тестов на списках с [`HeightSource::ThreadLocal`].
pub fn seed_thread_rng(seed: u64) {
    fastrand::seed(seed);
}
