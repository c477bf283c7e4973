//env
pub const DATABASE_URL_NOT_SET: &str = "DATABASE_URL not set!";

//request validation
pub const INVALID_NETWORK: &str = "Invalid network in request header";
pub const INVALID_PARAMS: &str = "Invalid parameters passed to the request";
pub const INVALID_ADDRESS: &str = "Invalid address";

//db
pub const DATABASE_CONNECTION_FAILED: &str = "Failed to connect to database";
pub const DATABASE_FETCH_POSTS_FAILED: &str = "Failed to fetch posts from database";

//upstream
pub const API_FETCH_ERROR: &str = "Something went wrong while fetching data. Please try again later";
pub const SUMMARY_GENERATION_FAILED: &str = "Failed to request content summary";
