//! Demand API endpoints: surveys, qualifications, quotas, supplier groups,
//! allocations, feasibility and survey groups.

use serde::Serialize;
use serde_json::{json, Value};

use super::LucidClient;
use crate::error::ValidationError;
use crate::http::HttpMethod;
use crate::request::DeferredRequest;
use crate::types::ReconcileRequest;
use crate::validate::{check_tracking_type, payload, require, PathArg};

impl LucidClient {
    pub fn create_survey(&self, data: &impl Serialize) -> Result<DeferredRequest, ValidationError> {
        Ok(self.write(
            HttpMethod::Post,
            "/Demand/v1/Surveys/Create".to_string(),
            payload(data)?,
        ))
    }

    pub fn update_survey(
        &self,
        survey_number: impl PathArg,
        data: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        let sn = require("SurveyNumber", &survey_number)?;
        Ok(self.write(
            HttpMethod::Put,
            format!("/Demand/v1/Surveys/Update/{sn}"),
            payload(data)?,
        ))
    }

    pub fn get_survey(&self, survey_number: impl PathArg) -> Result<DeferredRequest, ValidationError> {
        let sn = require("SurveyNumber", &survey_number)?;
        Ok(self.request(format!("/Demand/v1/Surveys/BySurveyNumber/{sn}")))
    }

    pub fn get_surveys_by_status(
        &self,
        survey_status: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let status = require("SurveyStatus", &survey_status)?;
        Ok(self.request(format!("/Demand/v1/Surveys/BySurveyStatus/{status}")))
    }

    pub fn reconcile_survey<I, S>(
        &self,
        survey_number: impl PathArg,
        response_ids: I,
    ) -> Result<DeferredRequest, ValidationError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let sn = require("SurveyNumber", &survey_number)?;
        let body = ReconcileRequest {
            response_ids: response_ids.into_iter().map(Into::into).collect(),
        };
        Ok(self.write(
            HttpMethod::Post,
            format!("/Demand/v1/Surveys/Reconcile/{sn}"),
            payload(&body)?,
        ))
    }

    pub fn create_qualification(
        &self,
        survey_number: impl PathArg,
        data: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        self.survey_write(HttpMethod::Post, "/Demand/v1/SurveyQualifications/Create", survey_number, data)
    }

    pub fn update_qualification(
        &self,
        survey_number: impl PathArg,
        data: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        self.survey_write(HttpMethod::Put, "/Demand/v1/SurveyQualifications/Update", survey_number, data)
    }

    pub fn get_demand_qualifications(
        &self,
        survey_number: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        self.survey_read("/Demand/v1/SurveyQualifications/BySurveyNumber", survey_number)
    }

    pub fn create_quota(
        &self,
        survey_number: impl PathArg,
        data: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        self.survey_write(HttpMethod::Post, "/Demand/v1/SurveyQuotas/Create", survey_number, data)
    }

    pub fn update_quota(
        &self,
        survey_number: impl PathArg,
        data: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        self.survey_write(HttpMethod::Put, "/Demand/v1/SurveyQuotas/Update", survey_number, data)
    }

    pub fn get_demand_quotas(
        &self,
        survey_number: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        self.survey_read("/Demand/v1/SurveyQuotas/BySurveyNumber", survey_number)
    }

    pub fn get_exchange_templates(&self) -> DeferredRequest {
        self.request("/Demand/v1/ExchangeTemplates/GetAll")
    }

    pub fn apply_exchange_template(
        &self,
        survey_number: impl PathArg,
        exchange_template_id: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let sn = require("SurveyNumber", &survey_number)?;
        let template = require("ExchangeTemplateID", &exchange_template_id)?;
        Ok(self
            .request(format!(
                "/Demand/v1/ExchangeTemplates/ApplyToSurvey/{sn}/{template}"
            ))
            .with_method(HttpMethod::Post))
    }

    pub fn create_group(
        &self,
        survey_number: impl PathArg,
        data: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        self.survey_write(HttpMethod::Post, "/Demand/v1/SupplierGroups/CreateWithSuppliers", survey_number, data)
    }

    pub fn create_empty_group(
        &self,
        survey_number: impl PathArg,
        data: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        self.survey_write(HttpMethod::Post, "/Demand/v1/SupplierGroups/Create", survey_number, data)
    }

    pub fn update_group(
        &self,
        survey_number: impl PathArg,
        data: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        self.survey_write(HttpMethod::Put, "/Demand/v1/SupplierGroups/Update", survey_number, data)
    }

    pub fn delete_group(
        &self,
        survey_number: impl PathArg,
        supplier_group_id: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let sn = require("SurveyNumber", &survey_number)?;
        let group = require("SupplierGroupID", &supplier_group_id)?;
        Ok(self
            .request(format!("/Demand/v1/SupplierGroups/Delete/{sn}/{group}"))
            .with_method(HttpMethod::Delete))
    }

    pub fn add_to_group(
        &self,
        survey_number: impl PathArg,
        supplier_group_id: impl PathArg,
        supplier_code: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let sn = require("SurveyNumber", &survey_number)?;
        let group = require("SupplierGroupID", &supplier_group_id)?;
        require("SupplierCode", &supplier_code)?;
        Ok(self.write(
            HttpMethod::Post,
            format!("/Demand/v1/SupplierGroups/AddSuppliersToGroup/{sn}/{group}"),
            json!({ "SupplierCode": supplier_code.to_json() }),
        ))
    }

    pub fn remove_from_group(
        &self,
        survey_number: impl PathArg,
        supplier_code: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let sn = require("SurveyNumber", &survey_number)?;
        require("SupplierCode", &supplier_code)?;
        Ok(self.write(
            HttpMethod::Put,
            format!("/Demand/v1/SupplierGroups/RemoveSuppliersFromGroup/{sn}"),
            json!({ "SupplierCode": supplier_code.to_json() }),
        ))
    }

    pub fn get_groups(&self, survey_number: impl PathArg) -> Result<DeferredRequest, ValidationError> {
        self.survey_read("/Demand/v1/SupplierGroups/BySurveyNumber", survey_number)
    }

    pub fn get_allocations(
        &self,
        survey_number: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        self.survey_read("/Demand/v1/SupplierAllocations/BySurveyNumber", survey_number)
    }

    pub fn create_allocation(
        &self,
        survey_number: impl PathArg,
        data: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        self.survey_write(HttpMethod::Post, "/Demand/v1/SupplierAllocations/Create", survey_number, data)
    }

    pub fn update_allocation(
        &self,
        survey_number: impl PathArg,
        data: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        self.survey_write(HttpMethod::Put, "/Demand/v1/SupplierAllocations/Update", survey_number, data)
    }

    pub fn delete_allocation(
        &self,
        survey_number: impl PathArg,
        supplier_code: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let (sn, sc) = survey_and_supplier(&survey_number, &supplier_code)?;
        Ok(self
            .request(format!("/Demand/v1/SupplierAllocations/Delete/{sn}/{sc}"))
            .with_method(HttpMethod::Delete))
    }

    pub fn create_non_exchange_link(
        &self,
        survey_number: impl PathArg,
        supplier_code: impl PathArg,
        data: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        let (sn, sc) = survey_and_supplier(&survey_number, &supplier_code)?;
        let body = payload(data)?;
        check_tracking_type(&body)?;
        Ok(self.write(
            HttpMethod::Post,
            format!("/Demand/v1/SupplierAllocations/Targets/Create/{sn}/{sc}"),
            body,
        ))
    }

    pub fn update_non_exchange_link(
        &self,
        survey_number: impl PathArg,
        supplier_code: impl PathArg,
        data: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        let (sn, sc) = survey_and_supplier(&survey_number, &supplier_code)?;
        let body = payload(data)?;
        check_tracking_type(&body)?;
        Ok(self.write(
            HttpMethod::Put,
            format!("/Demand/v1/SupplierAllocations/Targets/Update/{sn}/{sc}"),
            body,
        ))
    }

    pub fn delete_non_exchange_link(
        &self,
        survey_number: impl PathArg,
        supplier_code: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let (sn, sc) = survey_and_supplier(&survey_number, &supplier_code)?;
        Ok(self
            .request(format!(
                "/Demand/v1/SupplierAllocations/Targets/Delete/{sn}/{sc}"
            ))
            .with_method(HttpMethod::Delete))
    }

    pub fn get_time_to_completion(
        &self,
        data: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        Ok(self.write(
            HttpMethod::Post,
            "/Demand/v1/Feasibility/Time".to_string(),
            payload(data)?,
        ))
    }

    pub fn get_price(&self, data: &impl Serialize) -> Result<DeferredRequest, ValidationError> {
        Ok(self.write(
            HttpMethod::Post,
            "/Demand/v1/Feasibility/Price".to_string(),
            payload(data)?,
        ))
    }

    pub fn get_completes_per_day(
        &self,
        data: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        Ok(self.write(
            HttpMethod::Post,
            "/Demand/v1/Feasibility/NumberOfRespondents".to_string(),
            payload(data)?,
        ))
    }

    pub fn get_demand_qualified_respondents(
        &self,
        survey_number: impl PathArg,
        supplier_code: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let sc = require("SupplierCode", &supplier_code)?;
        let sn = require("SurveyNumber", &survey_number)?;
        Ok(self.request(format!(
            "/Demand/v1/SurveyQualifiedRespondents/BySurveyNumberSupplierCode/{sn}/{sc}"
        )))
    }

    /// Body is sent as a one-element array around `data`.
    pub fn update_qualified_respondents(
        &self,
        survey_number: impl PathArg,
        supplier_code: impl PathArg,
        data: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        let sc = require("SupplierCode", &supplier_code)?;
        let sn = require("SurveyNumber", &survey_number)?;
        Ok(self.write(
            HttpMethod::Put,
            format!("/Demand/v1/SurveyQualifiedRespondents/Update/{sn}/{sc}"),
            Value::Array(vec![payload(data)?]),
        ))
    }

    pub fn get_demand_survey_groups(&self) -> DeferredRequest {
        self.request("/Demand/v1/SurveyGroups")
    }

    pub fn get_demand_survey_group(
        &self,
        survey_group_id: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let group = require("SurveyGroupID", &survey_group_id)?;
        Ok(self.request(format!("/Demand/v1/SurveyGroups/{group}")))
    }

    pub fn create_demand_survey_group(
        &self,
        data: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        Ok(self.write(
            HttpMethod::Post,
            "/Demand/v1/SurveyGroups".to_string(),
            payload(data)?,
        ))
    }

    pub fn add_demand_surveys_to_group(
        &self,
        survey_group_id: impl PathArg,
        survey_ids: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        self.survey_group_membership(HttpMethod::Post, survey_group_id, survey_ids)
    }

    pub fn update_demand_survey_group(
        &self,
        survey_group_id: impl PathArg,
        survey_ids: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        self.survey_group_membership(HttpMethod::Put, survey_group_id, survey_ids)
    }

    pub fn delete_from_demand_survey_group(
        &self,
        survey_group_id: impl PathArg,
        survey_ids: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        self.survey_group_membership(HttpMethod::Delete, survey_group_id, survey_ids)
    }

    fn survey_read(
        &self,
        prefix: &str,
        survey_number: impl PathArg,
    ) -> Result<DeferredRequest, ValidationError> {
        let sn = require("SurveyNumber", &survey_number)?;
        Ok(self.request(format!("{prefix}/{sn}")))
    }

    fn survey_write(
        &self,
        method: HttpMethod,
        prefix: &str,
        survey_number: impl PathArg,
        data: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        let sn = require("SurveyNumber", &survey_number)?;
        Ok(self.write(method, format!("{prefix}/{sn}"), payload(data)?))
    }

    // The API expects the id list wrapped in an outer array.
    fn survey_group_membership(
        &self,
        method: HttpMethod,
        survey_group_id: impl PathArg,
        survey_ids: &impl Serialize,
    ) -> Result<DeferredRequest, ValidationError> {
        let group = require("SurveyGroupID", &survey_group_id)?;
        Ok(self.write(
            method,
            format!("/Demand/v1/SurveyGroups/{group}"),
            Value::Array(vec![payload(survey_ids)?]),
        ))
    }
}

fn survey_and_supplier(
    survey_number: &impl PathArg,
    supplier_code: &impl PathArg,
) -> Result<(String, String), ValidationError> {
    let sn = require("SurveyNumber", survey_number)?;
    let sc = require("SupplierCode", supplier_code)?;
    Ok((sn, sc))
}
