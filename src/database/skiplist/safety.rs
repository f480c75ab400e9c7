/// Макрос для валидации условий с возвратом ошибки.
#[macro_export]
macro_rules! validate {
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Высота башни вне диапазона `1..=max_height`
    InvalidHeight {
        node_height: usize,
        max_height: usize,
    },
    /// Нарушен порядок сортировки на уровне
    SortOrderViolation { level: usize, message: String },
    /// Длина списка не соответствует реальному кол-ву узлов
    LengthMismatch { expected: usize, actual: usize },
    /// Башня связана не на всех своих уровнях (или выше своей высоты)
    TornTower { level: usize, message: String },
    /// Текущая высота не равна наибольшей присутствующей
    HeightMismatch { current: usize, actual: usize },
    /// Обнаружена циклическая ссылка
    CyclicReference { level: usize },
}

/// Статистика структуры SkipList.
#[derive(Debug, Clone, PartialEq)]
pub struct SkipListStatistics {
    /// Количество узлов
    pub node_count: usize,
    /// `height_distribution[h - 1]` - число башен высоты `h`
    pub height_distribution: Vec<usize>,
    /// Текущая высота списка
    pub current_height: usize,
    /// Максимально возможная высота
    pub max_height: usize,
    /// Средняя высота башни
    pub average_height: f64,
}

impl SkipListStatistics {
    /// Создает пустую статистику.
    pub fn empty(max_height: usize) -> Self {
        Self {
            node_count: 0,
            height_distribution: vec![0; max_height],
            current_height: 1,
            max_height,
            average_height: 0.0,
        }
    }

    /// Вычисляет среднюю высоту.
    pub fn compute_average_height(&mut self) {
        if self.node_count == 0 {
            self.average_height = 0.0;
            return;
        }

        let total: usize = self
            .height_distribution
            .iter()
            .enumerate()
            .map(|(i, &count)| (i + 1) * count)
            .sum();

        self.average_height = total as f64 / self.node_count as f64;
    }

    /// Доля башен высотой не меньше `height`.
    pub fn fraction_at_least(
        &self,
        height: usize,
    ) -> f64 {
        if self.node_count == 0 || height == 0 {
            return if height == 0 { 1.0 } else { 0.0 };
        }

        let count: usize = self
            .height_distribution
            .iter()
            .skip(height - 1)
            .sum();

        count as f64 / self.node_count as f64
    }

    /// Форматирует статистику для вывода.
    pub fn format_report(&self) -> String {
        let mut report = String::new();
        report.push_str("SkipList Statistics:\n");
        report.push_str(&format!("  Total nodes: {}\n", self.node_count));
        report.push_str(&format!("  Current height: {}\n", self.current_height));
        report.push_str(&format!("  Max height: {}\n", self.max_height));
        report.push_str(&format!("  Average height: {:.2}\n", self.average_height));
        report.push_str("  Height distribution:\n");

        for (i, &count) in self.height_distribution.iter().enumerate() {
            if count > 0 {
                let percentage = (count as f64 / self.node_count as f64) * 100.0;
                report.push_str(&format!(
                    "    Height {}: {} nodes ({:.1}%)\n",
                    i + 1,
                    count,
                    percentage
                ));
            }
        }

        report
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        match self {
            ValidationError::InvalidHeight {
                node_height,
                max_height,
            } => {
                write!(
                    f,
                    "Node height {node_height} is outside 1..={max_height}"
                )
            }
            ValidationError::SortOrderViolation { level, message } => {
                write!(f, "Sort order violation at level {level}: {message}")
            }
            ValidationError::LengthMismatch { expected, actual } => {
                write!(f, "Length mismatch: expected {expected}, got {actual}")
            }
            ValidationError::TornTower { level, message } => {
                write!(f, "Torn tower at level {level}: {message}")
            }
            ValidationError::HeightMismatch { current, actual } => {
                write!(
                    f,
                    "Current height {current} differs from tallest tower {actual}"
                )
            }
            ValidationError::CyclicReference { level } => {
                write!(f, "Cyclic reference detected at level {level}")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
