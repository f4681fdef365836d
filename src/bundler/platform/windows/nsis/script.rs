//! NSIS installer script generation.
//!
//! Renders the version and installer define blocks with Handlebars, then
//! fills the `%%KEY%%` placeholders of the source tree's
//! `installers/windows/installer_template.nsi`.

use super::{file_commands::FileCommands, utils};
use crate::bundler::{
    error::{Error, ErrorExt, Result},
    settings::{BuildMetadata, ChannelType},
};
use handlebars::Handlebars;
use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

/// Template location relative to the source root.
pub const TEMPLATE_PATH: &str = "installers/windows/installer_template.nsi";

const VERSION_BLOCK: &str = r#"
!define INSTEXE  "{{final_exe}}"
!define VERSION "{{version_short}}"
!define VERSION_LONG "{{version}}"
!define VERSION_DASHES "{{version_dashes}}"
"#;

const INST_VARS_BLOCK: &str = r#"
!define INSTOUTFILE "{{installer_file}}"
!define INSTEXE  "{{final_exe}}"
!define APPNAME   "{{app_name}}"
!define APPNAMEONEWORD   "{{app_name_oneword}}"
!define VERSION "{{version_short}}"
!define VERSION_LONG "{{version}}"
!define VERSION_DASHES "{{version_dashes}}"
!define URLNAME   "{{url_name}}"
!define CAPTIONSTR "{{caption}}"
!define VENDORSTR "{{vendor_string}}"
"#;

/// File name of the installer produced for `metadata`.
pub fn installer_file_name(metadata: &BuildMetadata) -> String {
    format!("{}_Setup.exe", metadata.installer_base_name())
}

/// Values substituted into the define blocks.
fn define_data(metadata: &BuildMetadata) -> BTreeMap<&'static str, String> {
    let branding = metadata.branding();
    let caption = if metadata.channel_type() == ChannelType::Release {
        branding.vendor.clone()
    } else {
        format!("{} ${{VERSION}}", metadata.app_name())
    };

    let mut data = BTreeMap::new();
    data.insert("installer_file", installer_file_name(metadata));
    data.insert("final_exe", metadata.final_exe());
    data.insert("app_name", metadata.app_name());
    data.insert("app_name_oneword", metadata.app_name_oneword());
    data.insert("version", metadata.version_joined("."));
    data.insert("version_short", metadata.version_short());
    data.insert("version_dashes", metadata.version_joined("-"));
    data.insert("url_name", branding.url_name.clone());
    data.insert("caption", caption);
    data.insert("vendor_string", branding.vendor_string.clone());
    data
}

/// Builds the placeholder -> replacement map for the installer template.
pub fn placeholder_values(
    metadata: &BuildMetadata,
    commands: &FileCommands,
) -> Result<BTreeMap<&'static str, String>> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars.register_template_string("version", VERSION_BLOCK)?;
    handlebars.register_template_string("inst_vars", INST_VARS_BLOCK)?;

    let data = define_data(metadata);

    let mut values = BTreeMap::new();
    values.insert("VERSION", handlebars.render("version", &data)?);
    values.insert("SOURCE", metadata.source_root().display().to_string());
    values.insert("INST_VARS", handlebars.render("inst_vars", &data)?);
    values.insert("INSTALL_FILES", commands.install.clone());
    values.insert("DELETE_FILES", commands.uninstall.clone());
    values.insert(
        "WIN64_BIN_BUILD",
        utils::win64_define(metadata.arch()).to_string(),
    );
    Ok(values)
}

/// Replaces every `%%KEY%%` in `template` with its value.
///
/// Unknown placeholders are left untouched.
pub fn substitute(template: &str, values: &BTreeMap<&str, String>) -> String {
    values.iter().fold(template.to_string(), |text, (key, value)| {
        text.replace(&format!("%%{}%%", key), value)
    })
}

/// Renders the installer template into `output_dir`.
///
/// # Errors
///
/// [`Error::TemplateMissing`] when the template is not in the source tree.
///
/// # Returns
///
/// Path to the written `.nsi` file (UTF-8 with BOM).
pub async fn generate_nsi_script(
    metadata: &BuildMetadata,
    commands: &FileCommands,
    output_dir: &Path,
) -> Result<PathBuf> {
    let template_path = metadata.src_path_of(TEMPLATE_PATH);
    if !template_path.is_file() {
        return Err(Error::TemplateMissing(template_path));
    }
    let template = tokio::fs::read_to_string(&template_path)
        .await
        .fs_context("reading NSIS template", &template_path)?;

    let values = placeholder_values(metadata, commands)?;
    let rendered = substitute(&template, &values);

    let nsi_path = output_dir.join(format!(
        "{}_setup_tmp.nsi",
        metadata.branding().vendor.to_lowercase().replace(' ', "_")
    ));
    utils::write_utf8_bom(&nsi_path, &rendered).await?;
    log::debug!("Wrote NSIS script {}", nsi_path.display());

    Ok(nsi_path)
}
