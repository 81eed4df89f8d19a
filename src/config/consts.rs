// src/config/consts.rs

// Net config
pub const HOST: &str = "https://sisab.saude.gov.br";
pub const PANEL_PATH: &str =
    "/paginas/acessoRestrito/relatorio/federal/indicadores/indicadorPainel.xhtml";
pub const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:91.0) Gecko/20100101 Firefox/91.0";
pub const ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";
pub const ACCEPT_LANGUAGE: &str = "pt-BR,en-US;q=0.8,en;q=0.5,pt;q=0.3";
pub const TIMEOUT_SECS: u64 = 60;

// Form vocabulary (JSF component ids on the panel page)
pub const FORM_ID: &str = "j_idt50";
pub const EXPORT_TRIGGER: &str = "j_idt84";
pub const VIEW_STATE: &str = "javax.faces.ViewState";
pub const INDEX: &str = "coIndicador";
pub const PERIOD: &str = "quadrimestre";
pub const VIEW: &str = "visaoEquipe";
pub const AREA: &str = "selectLinha";
pub const REGION: &str = "regiao";
pub const STATES: &str = "estados";
pub const STATE_FOR_MUNICIPALITY: &str = "estadoMunicipio";
pub const MUNICIPALITIES: &str = "municipios";

// Ajax metadata
pub const AJAX_SOURCE: &str = "javax.faces.source";
pub const AJAX_EVENT: &str = "javax.faces.partial.event";
pub const AJAX_EXECUTE: &str = "javax.faces.partial.execute";
pub const AJAX_RENDER: &str = "javax.faces.partial.render";
pub const AJAX_BEHAVIOR: &str = "javax.faces.behavior.event";
pub const AJAX_FLAG: &str = "javax.faces.partial.ajax";
pub const RENDER_TARGET: &str = "regioes";
pub const RENDER_LIST: &str = "regioes script";

// Area level codes
pub const AREA_NATIONAL: &str = "nacional";
pub const AREA_REGION: &str = "regiao";
pub const AREA_STATE: &str = "uf";
pub const AREA_MUNICIPALITY: &str = "ibge";

// CSV envelope: preamble, data block and footer are split by this
pub const ENVELOPE_DELIM: &str = "\n\n\n";

// Export
pub const DEFAULT_OUT_DIR: &str = "out";
pub const DEFAULT_FILE: &str = "sisab";
pub const EXPORT_EXT: &str = "csv";

// Local log
pub const LOG_FILE: &str = ".store/debug.log";
