//! Static coordinate tables backing the resolver.
//!
//! City entries are stored pre-normalized (lowercase, no punctuation,
//! single spaces) and keyed by the canonical state name.

pub(crate) struct StateCenter {
    pub name: &'static str,
    pub abbr: &'static str,
    pub lat: f64,
    pub lng: f64,
}

pub(crate) struct CityCoordinate {
    pub city: &'static str,
    pub state: &'static str,
    pub lat: f64,
    pub lng: f64,
}

macro_rules! state {
    ($name:expr, $abbr:expr, $lat:expr, $lng:expr) => {
        StateCenter {
            name: $name,
            abbr: $abbr,
            lat: $lat,
            lng: $lng,
        }
    };
}

macro_rules! city {
    ($city:expr, $state:expr, $lat:expr, $lng:expr) => {
        CityCoordinate {
            city: $city,
            state: $state,
            lat: $lat,
            lng: $lng,
        }
    };
}

pub(crate) static STATE_CENTERS: &[StateCenter] = &[
    state!("Alabama", "AL", 32.806671, -86.791130),
    state!("Alaska", "AK", 61.370716, -152.404419),
    state!("Arizona", "AZ", 33.729759, -111.431221),
    state!("Arkansas", "AR", 34.969704, -92.373123),
    state!("California", "CA", 36.116203, -119.681564),
    state!("Colorado", "CO", 39.059811, -105.311104),
    state!("Connecticut", "CT", 41.597782, -72.755371),
    state!("Delaware", "DE", 39.318523, -75.507141),
    state!("District of Columbia", "DC", 38.897438, -77.026817),
    state!("Florida", "FL", 27.766279, -81.686783),
    state!("Georgia", "GA", 33.040619, -83.643074),
    state!("Hawaii", "HI", 21.094318, -157.498337),
    state!("Idaho", "ID", 44.240459, -114.478828),
    state!("Illinois", "IL", 40.349457, -88.986137),
    state!("Indiana", "IN", 39.849426, -86.258278),
    state!("Iowa", "IA", 42.011539, -93.210526),
    state!("Kansas", "KS", 38.526600, -96.726486),
    state!("Kentucky", "KY", 37.668140, -84.670067),
    state!("Louisiana", "LA", 31.169546, -91.867805),
    state!("Maine", "ME", 44.693947, -69.381927),
    state!("Maryland", "MD", 39.063946, -76.802101),
    state!("Massachusetts", "MA", 42.230171, -71.530106),
    state!("Michigan", "MI", 43.326618, -84.536095),
    state!("Minnesota", "MN", 45.694454, -93.900192),
    state!("Mississippi", "MS", 32.741646, -89.678696),
    state!("Missouri", "MO", 38.456085, -92.288368),
    state!("Montana", "MT", 46.921925, -110.454353),
    state!("Nebraska", "NE", 41.125370, -98.268082),
    state!("Nevada", "NV", 38.313515, -117.055374),
    state!("New Hampshire", "NH", 43.452492, -71.563896),
    state!("New Jersey", "NJ", 40.298904, -74.521011),
    state!("New Mexico", "NM", 34.840515, -106.248482),
    state!("New York", "NY", 42.165726, -74.948051),
    state!("North Carolina", "NC", 35.630066, -79.806419),
    state!("North Dakota", "ND", 47.528912, -99.784012),
    state!("Ohio", "OH", 40.388783, -82.764915),
    state!("Oklahoma", "OK", 35.565342, -96.928917),
    state!("Oregon", "OR", 44.572021, -122.070938),
    state!("Pennsylvania", "PA", 40.590752, -77.209755),
    state!("Rhode Island", "RI", 41.680893, -71.511780),
    state!("South Carolina", "SC", 33.856892, -80.945007),
    state!("South Dakota", "SD", 44.299782, -99.438828),
    state!("Tennessee", "TN", 35.747845, -86.692345),
    state!("Texas", "TX", 31.054487, -97.563461),
    state!("Utah", "UT", 40.150032, -111.862434),
    state!("Vermont", "VT", 44.045876, -72.710686),
    state!("Virginia", "VA", 37.769337, -78.169968),
    state!("Washington", "WA", 47.400902, -121.490494),
    state!("West Virginia", "WV", 38.491226, -80.954453),
    state!("Wisconsin", "WI", 44.268543, -89.616508),
    state!("Wyoming", "WY", 42.755966, -107.302490),
];

pub(crate) static CITY_COORDINATES: &[CityCoordinate] = &[
    city!("albuquerque", "New Mexico", 35.0844, -106.6504),
    city!("asheville", "North Carolina", 35.5951, -82.5515),
    city!("atlanta", "Georgia", 33.7490, -84.3880),
    city!("austin", "Texas", 30.2672, -97.7431),
    city!("baltimore", "Maryland", 39.2904, -76.6122),
    city!("bend", "Oregon", 44.0582, -121.3153),
    city!("boise", "Idaho", 43.6150, -116.2023),
    city!("boston", "Massachusetts", 42.3601, -71.0589),
    city!("boulder", "Colorado", 40.0150, -105.2705),
    city!("bozeman", "Montana", 45.6770, -111.0429),
    city!("buffalo", "New York", 42.8864, -78.8784),
    city!("burlington", "Vermont", 44.4759, -73.2121),
    city!("charlotte", "North Carolina", 35.2271, -80.8431),
    city!("cherry hill", "New Jersey", 39.9348, -75.0307),
    city!("chicago", "Illinois", 41.8781, -87.6298),
    city!("colorado springs", "Colorado", 38.8339, -104.8214),
    city!("columbus", "Ohio", 39.9612, -82.9988),
    city!("dallas", "Texas", 32.7767, -96.7970),
    city!("denver", "Colorado", 39.7392, -104.9903),
    city!("detroit", "Michigan", 42.3314, -83.0458),
    city!("eugene", "Oregon", 44.0521, -123.0868),
    city!("flagstaff", "Arizona", 35.1983, -111.6513),
    city!("fort collins", "Colorado", 40.5853, -105.0844),
    city!("grand rapids", "Michigan", 42.9634, -85.6681),
    city!("houston", "Texas", 29.7604, -95.3698),
    city!("jackson", "Wyoming", 43.4799, -110.7624),
    city!("jersey city", "New Jersey", 40.7178, -74.0431),
    city!("kansas city", "Missouri", 39.0997, -94.5786),
    city!("las vegas", "Nevada", 36.1699, -115.1398),
    city!("los angeles", "California", 34.0522, -118.2437),
    city!("miami", "Florida", 25.7617, -80.1918),
    city!("minneapolis", "Minnesota", 44.9778, -93.2650),
    city!("missoula", "Montana", 46.8721, -113.9940),
    city!("nashville", "Tennessee", 36.1627, -86.7816),
    city!("new york", "New York", 40.7128, -74.0060),
    city!("newark", "New Jersey", 40.7357, -74.1724),
    city!("orlando", "Florida", 28.5383, -81.3792),
    city!("philadelphia", "Pennsylvania", 39.9526, -75.1652),
    city!("phoenix", "Arizona", 33.4484, -112.0740),
    city!("pittsburgh", "Pennsylvania", 40.4406, -79.9959),
    city!("portland", "Maine", 43.6591, -70.2568),
    city!("portland", "Oregon", 45.5152, -122.6784),
    city!("princeton", "New Jersey", 40.3573, -74.6672),
    city!("provo", "Utah", 40.2338, -111.6585),
    city!("raleigh", "North Carolina", 35.7796, -78.6382),
    city!("reno", "Nevada", 39.5296, -119.8138),
    city!("richmond", "Virginia", 37.5407, -77.4360),
    city!("sacramento", "California", 38.5816, -121.4944),
    city!("salt lake city", "Utah", 40.7608, -111.8910),
    city!("san antonio", "Texas", 29.4241, -98.4936),
    city!("san diego", "California", 32.7157, -117.1611),
    city!("san francisco", "California", 37.7749, -122.4194),
    city!("san jose", "California", 37.3382, -121.8863),
    city!("santa fe", "New Mexico", 35.6870, -105.9378),
    city!("seattle", "Washington", 47.6062, -122.3321),
    city!("spokane", "Washington", 47.6588, -117.4260),
    city!("st louis", "Missouri", 38.6270, -90.1994),
    city!("tampa", "Florida", 27.9506, -82.4572),
    city!("toms river", "New Jersey", 39.9537, -74.1979),
    city!("trenton", "New Jersey", 40.2171, -74.7429),
    city!("tucson", "Arizona", 32.2226, -110.9747),
    city!("washington", "District of Columbia", 38.9072, -77.0369),
];
