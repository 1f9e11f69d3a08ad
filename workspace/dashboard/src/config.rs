use serde::Deserialize;
use std::time::Duration;

/// Base path of the dashboard API.
pub const DEFAULT_API_BASE: &str = "/api/dashboard";

/// Cadence of the live stats refresh.
pub const DEFAULT_STATS_INTERVAL: Duration = Duration::from_millis(30_000);

/// Element holding the anti-forgery token.
pub const DEFAULT_CSRF_SELECTOR: &str = "[name=csrfmiddlewaretoken]";

/// Which dashboard the page renders; decides the revenue chart variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DashboardMode {
    /// Platform administrators: revenue share per operator.
    Admin,
    /// Bus operators: revenue per route.
    #[default]
    Operator,
}

impl DashboardMode {
    pub fn from_admin_flag(is_admin: bool) -> Self {
        if is_admin {
            DashboardMode::Admin
        } else {
            DashboardMode::Operator
        }
    }

    pub fn is_admin(self) -> bool {
        self == DashboardMode::Admin
    }
}

/// Built-in series used when the page injects nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct DefaultSeries {
    pub weekly_bookings: Vec<f64>,
    pub revenue_distribution: Vec<f64>,
    pub route_revenue: Vec<f64>,
}

impl Default for DefaultSeries {
    fn default() -> Self {
        Self {
            weekly_bookings: vec![120.0, 145.0, 132.0, 158.0, 147.0, 210.0, 194.0],
            revenue_distribution: vec![35.0, 28.0, 15.0, 22.0],
            route_revenue: vec![1_200_000.0, 950_000.0, 650_000.0, 880_000.0, 720_000.0],
        }
    }
}

/// Series the backend inlined into the page, each one optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectedSeries {
    #[serde(default, alias = "weeklyBookingsData")]
    pub weekly_bookings: Option<Vec<f64>>,
    #[serde(default, alias = "revenueDistributionData")]
    pub revenue_distribution: Option<Vec<f64>>,
    #[serde(default, alias = "routeRevenueData")]
    pub route_revenue: Option<Vec<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesConfig {
    pub defaults: DefaultSeries,
    pub injected: InjectedSeries,
}

impl SeriesConfig {
    pub fn with_injected(injected: InjectedSeries) -> Self {
        Self {
            defaults: DefaultSeries::default(),
            injected,
        }
    }

    /// Injected series win over defaults, slot by slot.
    pub fn resolve(self) -> DefaultSeries {
        let SeriesConfig { defaults, injected } = self;
        DefaultSeries {
            weekly_bookings: injected.weekly_bookings.unwrap_or(defaults.weekly_bookings),
            revenue_distribution: injected
                .revenue_distribution
                .unwrap_or(defaults.revenue_distribution),
            route_revenue: injected.route_revenue.unwrap_or(defaults.route_revenue),
        }
    }
}

/// Everything a controller needs besides its platform.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub mode: DashboardMode,
    /// Prefix for the dashboard endpoints, without a trailing slash.
    pub api_base: String,
    pub stats_interval: Duration,
    pub csrf_selector: String,
    pub series: SeriesConfig,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            mode: DashboardMode::default(),
            api_base: DEFAULT_API_BASE.to_string(),
            stats_interval: DEFAULT_STATS_INTERVAL,
            csrf_selector: DEFAULT_CSRF_SELECTOR.to_string(),
            series: SeriesConfig::default(),
        }
    }
}

impl DashboardConfig {
    pub fn with_mode(mut self, mode: DashboardMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_stats_interval(mut self, interval: Duration) -> Self {
        self.stats_interval = interval;
        self
    }

    pub fn with_injected(mut self, injected: InjectedSeries) -> Self {
        self.series.injected = injected;
        self
    }

    /// `{api_base}/{chart}-data/?period={period}`
    pub fn chart_data_url(&self, chart: &str, period: &str) -> String {
        format!("{}/{}-data/?period={}", self.api_base, chart, period)
    }

    /// `{api_base}/live-stats/`
    pub fn live_stats_url(&self) -> String {
        format!("{}/live-stats/", self.api_base)
    }
}
