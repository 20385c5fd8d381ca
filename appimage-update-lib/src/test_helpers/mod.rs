pub mod mock_content_fetcher;
pub mod stub_direct;
