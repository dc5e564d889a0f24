//! Supply API endpoints: offerwall surveys, allocations, supplier links and
//! statistics, all scoped to a supplier code.

use serde::Serialize;

use super::LucidClient;
use crate::error::ValidationError;
use crate::http::HttpMethod;
use crate::request::DeferredRequest;
use crate::validate::{check_tracking_type, payload, require, require_date, DateArg, PathArg};

impl LucidClient {
    pub fn get_exchange_surveys(
        &self,
        supplier_code: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let sc = require("SupplierCode", &supplier_code)?;
        Ok(self.request(format!("/Supply/v1/Surveys/AllOfferwall/{sc}")))
    }

    pub fn get_allocated_surveys(
        &self,
        supplier_code: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let sc = require("SupplierCode", &supplier_code)?;
        Ok(self.request(format!("/Supply/v1/Surveys/SupplierAllocations/All/{sc}")))
    }

    pub fn get_allocated_survey(
        &self,
        supplier_code: impl PathArg,
        survey_number: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let (sc, sn) = supplier_and_survey(&supplier_code, &survey_number)?;
        Ok(self.request(format!(
            "/Supply/v1/Surveys/SupplierAllocations/BySurveyNumber/{sn}/{sc}"
        )))
    }

    /// Allocations made since `date`. Timestamps are rendered as UTC days.
    pub fn get_recently_allocated_surveys(
        &self,
        date: impl Into<DateArg>,
        supplier_code: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let day = require_date("date", date.into())?;
        let sc = require("SupplierCode", &supplier_code)?;
        Ok(self.request(format!(
            "/Supply/v1/Surveys/SupplierAllocations/ByDate/{day}/{sc}"
        )))
    }

    pub fn get_survey_groups(
        &self,
        supplier_code: impl PathArg,
        survey_number: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let (sc, sn) = supplier_and_survey(&supplier_code, &survey_number)?;
        Ok(self.request(format!(
            "/Supply/v1/Surveys/SurveyGroups/BySurveyNumber/{sn}/{sc}"
        )))
    }

    pub fn get_qualifications(
        &self,
        survey_number: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let sn = require("SurveyNumber", &survey_number)?;
        Ok(self.request(format!(
            "/Supply/v1/SurveyQualifications/BySurveyNumberForOfferwall/{sn}"
        )))
    }

    pub fn get_quotas(
        &self,
        supplier_code: impl PathArg,
        survey_number: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let (sc, sn) = supplier_and_survey(&supplier_code, &survey_number)?;
        Ok(self.request(format!(
            "/Supply/v1/SurveyQuotas/BySurveyNumber/{sn}/{sc}"
        )))
    }

    pub fn create_link(
        &self,
        supplier_code: impl PathArg,
        survey_number: impl PathArg,
        data: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        let (sc, sn) = supplier_and_survey(&supplier_code, &survey_number)?;
        let body = link_payload(data)?;
        Ok(self.write(
            HttpMethod::Post,
            format!("/Supply/v1/SupplierLinks/Create/{sn}/{sc}"),
            body,
        ))
    }

    pub fn update_link(
        &self,
        supplier_code: impl PathArg,
        survey_number: impl PathArg,
        data: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        let (sc, sn) = supplier_and_survey(&supplier_code, &survey_number)?;
        let body = link_payload(data)?;
        Ok(self.write(
            HttpMethod::Put,
            format!("/Supply/v1/SupplierLinks/Update/{sn}/{sc}"),
            body,
        ))
    }

    pub fn get_link(
        &self,
        supplier_code: impl PathArg,
        survey_number: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let (sc, sn) = supplier_and_survey(&supplier_code, &survey_number)?;
        Ok(self.request(format!(
            "/Supply/v1/SupplierLinks/BySurveyNumber/{sn}/{sc}"
        )))
    }

    pub fn get_statistics(
        &self,
        supplier_code: impl PathArg,
        survey_number: impl PathArg,
        scope: impl PathArg,
        timespan: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let (sc, sn) = supplier_and_survey(&supplier_code, &survey_number)?;
        let scope = require("Scope", &scope)?;
        let timespan = require("Timespan", &timespan)?;
        Ok(self.request(format!(
            "/Supply/v1/SurveyStatistics/BySurveyNumber/{sn}/{sc}/{scope}/{timespan}"
        )))
    }

    pub fn get_statistic_list(
        &self,
        supplier_code: impl PathArg,
        scope: impl PathArg,
        timespan: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let sc = require("SupplierCode", &supplier_code)?;
        let scope = require("Scope", &scope)?;
        let timespan = require("Timespan", &timespan)?;
        Ok(self.request(format!(
            "/Supply/v1/SurveyStatistics/All/{sc}/{scope}/{timespan}"
        )))
    }

    pub fn get_marketing_info(
        &self,
        supplier_code: impl PathArg,
        survey_number: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let (sc, sn) = supplier_and_survey(&supplier_code, &survey_number)?;
        Ok(self.request(format!(
            "/Supply/v1/Surveys/MarketingInformation/BySurveyNumber/{sn}/{sc}"
        )))
    }

    pub fn get_qualified_respondents(
        &self,
        supplier_code: impl PathArg,
        survey_number: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let (sc, sn) = supplier_and_survey(&supplier_code, &survey_number)?;
        Ok(self.request(format!(
            "/Supply/v1/SurveyQualifiedRespondents/BySurveyNumberSupplierCode/{sn}/{sc}"
        )))
    }
}

fn supplier_and_survey(
    supplier_code: &impl PathArg,
    survey_number: &impl PathArg,
) -> Result<(String, String), ValidationError> {
    let sc = require("SupplierCode", supplier_code)?;
    let sn = require("SurveyNumber", survey_number)?;
    Ok((sc, sn))
}

fn link_payload(data: &impl Serialize) -> Result<serde_json::Value, ValidationError> {
    let body = payload(data)?;
    check_tracking_type(&body)?;
    Ok(body)
}
