//! The remote spreadsheet API seam and its Google Sheets implementation.

use google_sheets4::api::{
    BatchUpdateSpreadsheetRequest, BatchUpdateSpreadsheetResponse, Spreadsheet,
    UpdateValuesResponse, ValueRange,
};
use google_sheets4::hyper::client::HttpConnector;
use google_sheets4::hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use google_sheets4::{hyper, Sheets};
use tally_protocol::{ValueInputOption, ValueRenderOption};
use tokio::runtime::Runtime;

use crate::auth::{self, SCOPES};
use crate::config::CredentialsConfig;
use crate::error::Result;

/// The four remote calls the façade needs, in the SDK's request and response
/// types. Ranges are A1 strings such as `Results!C5:C14`.
pub trait SpreadsheetService: Send + Sync {
    /// `spreadsheets.values.get`
    fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        render: ValueRenderOption,
    ) -> Result<ValueRange>;

    /// `spreadsheets.values.update`
    fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        body: ValueRange,
        input: ValueInputOption,
    ) -> Result<UpdateValuesResponse>;

    /// `spreadsheets.get`
    fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet>;

    /// `spreadsheets.batchUpdate`
    fn batch_update(
        &self,
        spreadsheet_id: &str,
        request: BatchUpdateSpreadsheetRequest,
    ) -> Result<BatchUpdateSpreadsheetResponse>;
}

type Hub = Sheets<HttpsConnector<HttpConnector>>;

/// A live, authorized Google Sheets session.
///
/// The SDK is async; each session owns a current-thread runtime and blocks on
/// every call.
pub struct GoogleSheetsService {
    runtime: Runtime,
    hub: Hub,
}

impl GoogleSheetsService {
    /// Load credentials, authorize, and build the SDK hub.
    ///
    /// With installed-app credentials and no cached token this opens the
    /// browser consent flow and waits for the redirect.
    pub fn connect(config: &CredentialsConfig) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;

        let auth = runtime.block_on(auth::authenticator(config))?;
        let client = hyper::Client::builder().build(
            HttpsConnectorBuilder::new()
                .with_native_roots()?
                .https_only()
                .enable_http1()
                .build(),
        );
        let mut hub = Sheets::new(client, auth);
        hub.user_agent(config.application_name.clone());

        Ok(Self { runtime, hub })
    }

    /// Point the session at a different API endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.hub.base_url(base_url.into());
        self
    }
}

impl SpreadsheetService for GoogleSheetsService {
    fn get_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        render: ValueRenderOption,
    ) -> Result<ValueRange> {
        let call = self
            .hub
            .spreadsheets()
            .values_get(spreadsheet_id, range)
            .value_render_option(render.as_str())
            .add_scopes(SCOPES);
        let (_, values) = self.runtime.block_on(call.doit())?;
        Ok(values)
    }

    fn update_values(
        &self,
        spreadsheet_id: &str,
        range: &str,
        body: ValueRange,
        input: ValueInputOption,
    ) -> Result<UpdateValuesResponse> {
        let call = self
            .hub
            .spreadsheets()
            .values_update(body, spreadsheet_id, range)
            .value_input_option(input.as_str())
            .add_scopes(SCOPES);
        let (_, response) = self.runtime.block_on(call.doit())?;
        Ok(response)
    }

    fn get_spreadsheet(&self, spreadsheet_id: &str) -> Result<Spreadsheet> {
        tracing::trace!("spreadsheets.get {spreadsheet_id}");
        let call = self
            .hub
            .spreadsheets()
            .get(spreadsheet_id)
            .param("fields", "spreadsheetId,properties.title,sheets.properties")
            .add_scopes(SCOPES);
        let (_, spreadsheet) = self.runtime.block_on(call.doit())?;
        Ok(spreadsheet)
    }

    fn batch_update(
        &self,
        spreadsheet_id: &str,
        request: BatchUpdateSpreadsheetRequest,
    ) -> Result<BatchUpdateSpreadsheetResponse> {
        let call = self
            .hub
            .spreadsheets()
            .batch_update(request, spreadsheet_id)
            .add_scopes(SCOPES);
        let (_, response) = self.runtime.block_on(call.doit())?;
        Ok(response)
    }
}
