/// Radio por defecto (en km) para la búsqueda de restaurantes cercanos.
pub const DEFAULT_RADIUS_KM: f64 = 5.0;

/// Centro del mapa por defecto: Ciudad de México.
pub const DEFAULT_MAP_CENTER: (f64, f64) = (19.4326, -99.1332);
pub const DEFAULT_MAP_ZOOM: u8 = 13;

/// Opciones de geolocalización.
pub const GEOLOCATION_TIMEOUT_SECS: u64 = 10;
pub const WATCH_INTERVAL_MILLIS: u64 = 5000;

/// Retardo de "debounce" entre que el usuario escribe y se lanza la búsqueda.
pub const SEARCH_DEBOUNCE_MILLIS: u64 = 300;

/// Retardo cosmético entre elegir una opción del wizard y avanzar de paso.
pub const WIZARD_ADVANCE_MILLIS: u64 = 300;

/// Cantidad de recomendaciones pedidas al servicio de IA.
pub const RECOMMENDATION_TOP_N: u32 = 10;

/// Margen (px) al ajustar el viewport a los marcadores.
pub const FIT_BOUNDS_PADDING: u32 = 50;

/// Animación de la línea de ruta.
pub const ROUTE_DASH_TICK_MILLIS: u64 = 50;
pub const ROUTE_DASH_STEP: u32 = 1;

/// Tiempo máximo mostrando "calculando ruta" antes de degradar el panel.
pub const ROUTE_ESTIMATE_TIMEOUT_SECS: u64 = 15;

/// Velocidad usada para estimar tiempos de llegada (auto en ciudad).
pub const AVERAGE_SPEED_KMH: f64 = 25.0;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080/api";
pub const DEFAULT_AI_BASE_URL: &str = "http://localhost:8000";

/// Base para delegar la navegación real a la app de mapas externa.
pub const EXTERNAL_NAV_URL: &str = "https://www.google.com/maps/dir/?api=1";
