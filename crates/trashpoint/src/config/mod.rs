use crate::{error::TrashPointError, search::QueryConfig};

/// Builder for creating query configurations with ergonomic defaults
#[derive(Debug, Clone, Default)]
pub struct QueryConfigBuilder {
    config: QueryConfig,
}

impl QueryConfigBuilder {
    /// Create a new builder: three matches, no distance threshold
    pub fn new() -> Self {
        Self {
            config: QueryConfig::default(),
        }
    }

    /// Only the single closest stop
    pub fn nearest_only() -> Self {
        let mut builder = Self::new();
        builder.config.limit = 1;
        builder
    }

    /// Stops within walking distance (1 km) of the query point
    pub fn neighbourhood() -> Self {
        let mut builder = Self::new();
        builder.config.limit = 3;
        builder.config.max_distance_km = Some(1.0);
        builder
    }

    /// Set the maximum number of matches to return (at least 1)
    pub fn limit(mut self, limit: usize) -> Self {
        self.config.limit = limit.max(1);
        self
    }

    /// Set the inclusive distance threshold in kilometres
    pub fn max_distance_km(mut self, km: f64) -> Result<Self, TrashPointError> {
        if !km.is_finite() || km <= 0.0 {
            return Err(TrashPointError::ConfigError(format!(
                "Maximum distance must be a positive number of kilometres, got {km}"
            )));
        }
        self.config.max_distance_km = Some(km);
        Ok(self)
    }

    /// Remove any distance threshold
    pub fn no_max_distance(mut self) -> Self {
        self.config.max_distance_km = None;
        self
    }

    /// Build the final configuration
    pub fn build(self) -> QueryConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builder() {
        let config = QueryConfigBuilder::new().build();
        assert_eq!(config, QueryConfig::default());
        assert_eq!(config.limit, 3);
    }

    #[test]
    fn test_nearest_only_preset() {
        let config = QueryConfigBuilder::nearest_only().build();
        assert_eq!(config.limit, 1);
        assert!(config.max_distance_km.is_none());
    }

    #[test]
    fn test_neighbourhood_preset() {
        let config = QueryConfigBuilder::neighbourhood().build();
        assert_eq!(config.limit, 3);
        assert_eq!(config.max_distance_km, Some(1.0));
    }

    #[test]
    fn test_method_chaining() {
        let config = QueryConfigBuilder::nearest_only()
            .limit(5)
            .max_distance_km(2.5)
            .unwrap()
            .build();
        assert_eq!(config.limit, 5);
        assert_eq!(config.max_distance_km, Some(2.5));
    }

    #[test]
    fn test_override_preset_threshold() {
        let config = QueryConfigBuilder::neighbourhood().no_max_distance().build();
        assert!(config.max_distance_km.is_none());
    }

    #[test]
    fn test_limit_is_clamped() {
        let config = QueryConfigBuilder::new().limit(0).build();
        assert_eq!(config.limit, 1);
    }

    #[test]
    fn test_max_distance_validation() {
        assert!(QueryConfigBuilder::new().max_distance_km(0.5).is_ok());
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let result = QueryConfigBuilder::new().max_distance_km(bad);
            assert!(matches!(result, Err(TrashPointError::ConfigError(_))));
        }
    }
}
