mod engine_properties;
mod refresh_loop;

// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - engine_properties: classification, filtering and sorting guarantees
// - feed_mock: building the board from a mocked feed
// - refresh_loop: the refresh loop and components against real feed files
// - smoke_tests: configuration and feed service basics
