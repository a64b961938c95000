use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// 阅卷模式
///
/// 上游用字符串前缀（`assist*`）或满分为 0 来表示辅助模式，
/// 这里在读取数据时一次性转换为枚举。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum GradingMode {
    /// 正常计分
    #[default]
    Scored,
    /// 辅助模式：只给出建议，不计算分数
    Assist,
}

impl GradingMode {
    /// 从上游的模式字符串解析，`assist` 开头（不区分大小写）即为辅助模式
    pub fn from_mode_str(s: &str) -> Self {
        if s.trim().to_lowercase().starts_with("assist") {
            GradingMode::Assist
        } else {
            GradingMode::Scored
        }
    }

    /// 根据满分判断：满分为 0（或负数）表示辅助模式
    pub fn from_max_score(max_score: Option<f64>) -> Self {
        match max_score {
            Some(v) if v <= 0.0 => GradingMode::Assist,
            _ => GradingMode::Scored,
        }
    }

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            GradingMode::Scored => "scored",
            GradingMode::Assist => "assist",
        }
    }

    pub fn is_assist(self) -> bool {
        matches!(self, GradingMode::Assist)
    }
}

impl std::fmt::Display for GradingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl Serialize for GradingMode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for GradingMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Ok(Self::from_mode_str(&s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_mode_str() {
        assert_eq!(GradingMode::from_mode_str("assist_only"), GradingMode::Assist);
        assert_eq!(GradingMode::from_mode_str(" Assist"), GradingMode::Assist);
        assert_eq!(GradingMode::from_mode_str("standard"), GradingMode::Scored);
        assert_eq!(GradingMode::from_mode_str(""), GradingMode::Scored);
    }

    #[test]
    fn test_from_max_score() {
        assert_eq!(GradingMode::from_max_score(Some(0.0)), GradingMode::Assist);
        assert_eq!(GradingMode::from_max_score(Some(5.0)), GradingMode::Scored);
        assert_eq!(GradingMode::from_max_score(None), GradingMode::Scored);
    }

    #[test]
    fn test_serde_round_trip_uses_short_names() {
        let mode: GradingMode = serde_json::from_str("\"assist_mode\"").unwrap();
        assert_eq!(mode, GradingMode::Assist);
        assert_eq!(serde_json::to_string(&mode).unwrap(), "\"assist\"");
    }
}
