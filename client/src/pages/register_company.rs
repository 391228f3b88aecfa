//! Company self-registration: creates a tenant plus its administrator and
//! signs the administrator in.

#[cfg(test)]
#[path = "register_company_test.rs"]
mod register_company_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;

use crate::app::use_auth;
use crate::net::types::TenantRegistration;
use crate::state::toast::Toasts;

/// Tax conditions accepted by the registration procedure.
pub const VAT_CONDITIONS: [&str; 4] = ["Responsable Inscripto", "Monotributo", "Exento", "Consumidor Final"];

pub(crate) const MISSING_FIELDS: &str = "Please fill in all fields.";
pub(crate) const PASSWORD_MISMATCH: &str = "Passwords do not match.";
pub(crate) const BAD_EMPLOYEE_COUNT: &str = "Employee count must be a positive number.";

/// Raw form input, one string per control.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TenantForm {
    pub company_name: String,
    pub company_cuit: String,
    pub company_vat_condition: String,
    pub company_employee_count: String,
    pub company_fiscal_address: String,
    pub company_real_address: String,
    pub company_phone: String,
    pub company_responsable: String,
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl Default for TenantForm {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            company_cuit: String::new(),
            company_vat_condition: String::new(),
            company_employee_count: "1".to_owned(),
            company_fiscal_address: String::new(),
            company_real_address: String::new(),
            company_phone: String::new(),
            company_responsable: String::new(),
            full_name: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Field {
    CompanyName,
    Cuit,
    EmployeeCount,
    FiscalAddress,
    RealAddress,
    Phone,
    Responsable,
    FullName,
    Email,
    Password,
    ConfirmPassword,
}

impl Field {
    fn value(self, form: &TenantForm) -> &str {
        match self {
            Self::CompanyName => &form.company_name,
            Self::Cuit => &form.company_cuit,
            Self::EmployeeCount => &form.company_employee_count,
            Self::FiscalAddress => &form.company_fiscal_address,
            Self::RealAddress => &form.company_real_address,
            Self::Phone => &form.company_phone,
            Self::Responsable => &form.company_responsable,
            Self::FullName => &form.full_name,
            Self::Email => &form.email,
            Self::Password => &form.password,
            Self::ConfirmPassword => &form.confirm_password,
        }
    }

    fn slot(self, form: &mut TenantForm) -> &mut String {
        match self {
            Self::CompanyName => &mut form.company_name,
            Self::Cuit => &mut form.company_cuit,
            Self::EmployeeCount => &mut form.company_employee_count,
            Self::FiscalAddress => &mut form.company_fiscal_address,
            Self::RealAddress => &mut form.company_real_address,
            Self::Phone => &mut form.company_phone,
            Self::Responsable => &mut form.company_responsable,
            Self::FullName => &mut form.full_name,
            Self::Email => &mut form.email,
            Self::Password => &mut form.password,
            Self::ConfirmPassword => &mut form.confirm_password,
        }
    }
}

const COMPANY_FIELDS: [(&str, Field, &str); 7] = [
    ("Company name", Field::CompanyName, "text"),
    ("CUIT", Field::Cuit, "text"),
    ("Employee count", Field::EmployeeCount, "number"),
    ("Fiscal address", Field::FiscalAddress, "text"),
    ("Real address", Field::RealAddress, "text"),
    ("Phone", Field::Phone, "tel"),
    ("Responsible person", Field::Responsable, "text"),
];

const ADMIN_FIELDS: [(&str, Field, &str); 4] = [
    ("Full name", Field::FullName, "text"),
    ("Email", Field::Email, "email"),
    ("Password", Field::Password, "password"),
    ("Confirm password", Field::ConfirmPassword, "password"),
];

/// Presence checks plus password confirmation; produces the procedure payload.
pub(crate) fn validate_tenant_form(form: &TenantForm) -> Result<TenantRegistration, &'static str> {
    let trimmed = [
        &form.company_name,
        &form.company_cuit,
        &form.company_vat_condition,
        &form.company_fiscal_address,
        &form.company_real_address,
        &form.company_phone,
        &form.company_responsable,
        &form.full_name,
        &form.email,
    ];
    if trimmed.iter().any(|v| v.trim().is_empty()) || form.password.is_empty() {
        return Err(MISSING_FIELDS);
    }
    if form.password != form.confirm_password {
        return Err(PASSWORD_MISMATCH);
    }
    let company_employee_count = form
        .company_employee_count
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|n| *n >= 1)
        .ok_or(BAD_EMPLOYEE_COUNT)?;
    Ok(TenantRegistration {
        email: form.email.trim().to_owned(),
        password: form.password.clone(),
        full_name: form.full_name.trim().to_owned(),
        company_name: form.company_name.trim().to_owned(),
        company_cuit: form.company_cuit.trim().to_owned(),
        company_fiscal_address: form.company_fiscal_address.trim().to_owned(),
        company_real_address: form.company_real_address.trim().to_owned(),
        company_phone: form.company_phone.trim().to_owned(),
        company_responsable: form.company_responsable.trim().to_owned(),
        company_vat_condition: form.company_vat_condition.clone(),
        company_employee_count,
    })
}

fn field_inputs(form: RwSignal<TenantForm>, fields: &'static [(&'static str, Field, &'static str)]) -> impl IntoView {
    fields
        .iter()
        .map(|&(label, field, kind)| {
            view! {
                <label class="register-field">
                    <span>{label}</span>
                    <input
                        class="login-input"
                        type=kind
                        prop:value=move || form.with(|f| field.value(f).to_owned())
                        on:input=move |ev| form.update(|f| *field.slot(f) = event_target_value(&ev))
                    />
                </label>
            }
        })
        .collect_view()
}

#[component]
pub fn RegisterCompanyPage() -> impl IntoView {
    let auth = use_auth();
    let toasts = expect_context::<Toasts>();
    let navigate = use_navigate();
    let form = RwSignal::new(TenantForm::default());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let registration = match form.with(validate_tenant_form) {
            Ok(registration) => registration,
            Err(msg) => {
                toasts.error(msg);
                return;
            }
        };
        let Some(orchestrator) = auth.orchestrator() else {
            return;
        };
        busy.set(true);
        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            match orchestrator.register_tenant(&registration).await {
                Ok(_) => {
                    toasts.success("Company registered successfully!");
                    navigate("/dashboard", NavigateOptions::default());
                }
                Err(e) => toasts.error(e.message),
            }
            busy.set(false);
        });
    };

    view! {
        <div class="register-page">
            <div class="register-card">
                <h1>"Register your company"</h1>
                <p class="login-card__subtitle">
                    "Already have an account? " <A href="/login">"Sign in"</A>
                </p>
                <form class="register-form" on:submit=on_submit>
                    <fieldset>
                        <legend>"Company"</legend>
                        {field_inputs(form, &COMPANY_FIELDS)}
                        <label class="register-field">
                            <span>"VAT condition"</span>
                            <select
                                class="login-input"
                                prop:value=move || form.with(|f| f.company_vat_condition.clone())
                                on:change=move |ev| form.update(|f| f.company_vat_condition = event_target_value(&ev))
                            >
                                <option value="">"Select..."</option>
                                {VAT_CONDITIONS
                                    .iter()
                                    .map(|c| view! { <option value=*c>{*c}</option> })
                                    .collect_view()}
                            </select>
                        </label>
                    </fieldset>
                    <fieldset>
                        <legend>"Administrator"</legend>
                        {field_inputs(form, &ADMIN_FIELDS)}
                    </fieldset>
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Registering..." } else { "Register company" }}
                    </button>
                </form>
            </div>
        </div>
    }
}
