//! Pre-authored fallback contract templates
//!
//! One complete, syntactically closed contract per category. These are the
//! pipeline's safety net: every template must scan to zero issues and score
//! production-ready, which the fallback tests assert directly. Only the
//! contract name and token symbol are substituted at render time.

use contractforge_domain::ContractCategory;

/// Returns the registered template name and body for a category
pub(crate) fn template_for(category: ContractCategory) -> (&'static str, &'static str) {
    match category {
        ContractCategory::Collectible => ("collectible", COLLECTIBLE),
        ContractCategory::Fungible => ("fungible", FUNGIBLE),
        ContractCategory::Governance => ("governance", GOVERNANCE),
        ContractCategory::Marketplace => ("marketplace", MARKETPLACE),
        ContractCategory::Generic => ("generic", GENERIC),
    }
}

/// Every category, for registration and exhaustive testing
pub(crate) const ALL_CATEGORIES: [ContractCategory; 5] = [
    ContractCategory::Collectible,
    ContractCategory::Fungible,
    ContractCategory::Governance,
    ContractCategory::Marketplace,
    ContractCategory::Generic,
];

const COLLECTIBLE: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.19;

contract {{name}} {
    string public name;
    string public symbol;
    uint256 public totalMinted;
    address public owner;

    mapping(uint256 => address) private owners;
    mapping(address => uint256) private balances;
    mapping(uint256 => string) private tokenURIs;

    event Minted(address indexed to, uint256 indexed tokenId);
    event Transferred(address indexed from, address indexed to, uint256 indexed tokenId);

    modifier onlyOwner() {
        require(msg.sender == owner, "caller is not the owner");
        _;
    }

    constructor() {
        name = "{{name}}";
        symbol = "{{symbol}}";
        owner = msg.sender;
    }

    function mint(address to, string memory uri) public onlyOwner returns (uint256) {
        require(to != address(0), "mint to zero address");
        totalMinted += 1;
        uint256 tokenId = totalMinted;
        owners[tokenId] = to;
        balances[to] += 1;
        tokenURIs[tokenId] = uri;
        emit Minted(to, tokenId);
        return tokenId;
    }

    function transfer(address to, uint256 tokenId) public {
        require(owners[tokenId] == msg.sender, "caller does not own token");
        require(to != address(0), "transfer to zero address");
        owners[tokenId] = to;
        balances[msg.sender] -= 1;
        balances[to] += 1;
        emit Transferred(msg.sender, to, tokenId);
    }

    function ownerOf(uint256 tokenId) public view returns (address) {
        require(owners[tokenId] != address(0), "token does not exist");
        return owners[tokenId];
    }

    function balanceOf(address account) public view returns (uint256) {
        return balances[account];
    }

    function tokenURI(uint256 tokenId) public view returns (string memory) {
        return tokenURIs[tokenId];
    }
}
"#;

const FUNGIBLE: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.19;

contract {{name}} {
    string public name;
    string public symbol;
    uint8 public constant DECIMALS = 18;
    uint256 public totalSupply;
    address public owner;

    mapping(address => uint256) private balances;
    mapping(address => mapping(address => uint256)) private allowances;

    event Transfer(address indexed from, address indexed to, uint256 value);
    event Approval(address indexed holder, address indexed spender, uint256 value);

    constructor(uint256 initialSupply) {
        name = "{{name}}";
        symbol = "{{symbol}}";
        owner = msg.sender;
        totalSupply = initialSupply;
        balances[msg.sender] = initialSupply;
        emit Transfer(address(0), msg.sender, initialSupply);
    }

    function balanceOf(address account) public view returns (uint256) {
        return balances[account];
    }

    function transfer(address to, uint256 value) public returns (bool) {
        require(to != address(0), "transfer to zero address");
        require(balances[msg.sender] >= value, "insufficient balance");
        balances[msg.sender] -= value;
        balances[to] += value;
        emit Transfer(msg.sender, to, value);
        return true;
    }

    function approve(address spender, uint256 value) public returns (bool) {
        allowances[msg.sender][spender] = value;
        emit Approval(msg.sender, spender, value);
        return true;
    }

    function allowance(address holder, address spender) public view returns (uint256) {
        return allowances[holder][spender];
    }

    function transferFrom(address from, address to, uint256 value) public returns (bool) {
        require(to != address(0), "transfer to zero address");
        require(allowances[from][msg.sender] >= value, "allowance exceeded");
        require(balances[from] >= value, "insufficient balance");
        allowances[from][msg.sender] -= value;
        balances[from] -= value;
        balances[to] += value;
        emit Transfer(from, to, value);
        return true;
    }
}
"#;

const GOVERNANCE: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.19;

contract {{name}} {
    struct Proposal {
        string description;
        uint256 voteCount;
        uint256 deadline;
        address proposer;
    }

    uint256 public proposalCount;
    uint256 public constant VOTING_PERIOD = 3 days;
    address public chairperson;

    mapping(uint256 => Proposal) private proposals;
    mapping(uint256 => mapping(address => bool)) private hasVoted;
    mapping(address => uint256) public votingWeight;

    event ProposalCreated(uint256 indexed proposalId, address indexed proposer, string description);
    event VoteCast(uint256 indexed proposalId, address indexed voter, uint256 weight);

    constructor() {
        chairperson = msg.sender;
        votingWeight[msg.sender] = 1;
    }

    function enfranchise(address voter, uint256 weight) public {
        require(msg.sender == chairperson, "only chairperson");
        votingWeight[voter] = weight;
    }

    function propose(string memory description) public returns (uint256) {
        require(votingWeight[msg.sender] > 0, "no voting weight");
        proposalCount += 1;
        Proposal storage proposal = proposals[proposalCount];
        proposal.description = description;
        proposal.deadline = block.timestamp + VOTING_PERIOD;
        proposal.proposer = msg.sender;
        emit ProposalCreated(proposalCount, msg.sender, description);
        return proposalCount;
    }

    function vote(uint256 proposalId) public {
        require(votingWeight[msg.sender] > 0, "no voting weight");
        require(!hasVoted[proposalId][msg.sender], "already voted");
        require(block.timestamp <= proposals[proposalId].deadline, "voting closed");
        hasVoted[proposalId][msg.sender] = true;
        proposals[proposalId].voteCount += votingWeight[msg.sender];
        emit VoteCast(proposalId, msg.sender, votingWeight[msg.sender]);
    }

    function voteCountOf(uint256 proposalId) public view returns (uint256) {
        return proposals[proposalId].voteCount;
    }
}
"#;

const MARKETPLACE: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.19;

contract {{name}} {
    struct Listing {
        address seller;
        uint256 price;
        bool active;
    }

    uint256 public listingCount;
    uint256 public feeBps;
    address public owner;

    mapping(uint256 => Listing) private listings;
    mapping(address => uint256) private proceeds;

    event Listed(uint256 indexed listingId, address indexed seller, uint256 price);
    event Purchased(uint256 indexed listingId, address indexed buyer, uint256 price);
    event ProceedsWithdrawn(address indexed seller, uint256 amount);

    constructor(uint256 initialFeeBps) {
        require(initialFeeBps <= 1000, "fee too high");
        owner = msg.sender;
        feeBps = initialFeeBps;
    }

    function list(uint256 price) public returns (uint256) {
        require(price > 0, "price must be positive");
        listingCount += 1;
        listings[listingCount] = Listing(msg.sender, price, true);
        emit Listed(listingCount, msg.sender, price);
        return listingCount;
    }

    function buy(uint256 listingId) public payable {
        Listing storage listing = listings[listingId];
        require(listing.active, "listing not active");
        require(msg.value >= listing.price, "payment too low");
        listing.active = false;
        uint256 fee = (msg.value * feeBps) / 10000;
        proceeds[listing.seller] += msg.value - fee;
        proceeds[owner] += fee;
        emit Purchased(listingId, msg.sender, listing.price);
    }

    function withdraw() public {
        uint256 amount = proceeds[msg.sender];
        require(amount > 0, "nothing to withdraw");
        proceeds[msg.sender] = 0;
        payable(msg.sender).transfer(amount);
        emit ProceedsWithdrawn(msg.sender, amount);
    }

    function listingPrice(uint256 listingId) public view returns (uint256) {
        return listings[listingId].price;
    }
}
"#;

const GENERIC: &str = r#"// SPDX-License-Identifier: MIT
pragma solidity ^0.8.19;

contract {{name}} {
    uint256 private storedValue;
    uint256 public updateCount;
    address public owner;

    event ValueChanged(address indexed by, uint256 newValue);
    event OwnershipTransferred(address indexed previousOwner, address indexed newOwner);

    modifier onlyOwner() {
        require(msg.sender == owner, "caller is not the owner");
        _;
    }

    constructor() {
        owner = msg.sender;
    }

    function set(uint256 newValue) public onlyOwner {
        storedValue = newValue;
        updateCount += 1;
        emit ValueChanged(msg.sender, newValue);
    }

    function get() public view returns (uint256) {
        return storedValue;
    }

    function transferOwnership(address newOwner) public onlyOwner {
        require(newOwner != address(0), "new owner is zero address");
        emit OwnershipTransferred(owner, newOwner);
        owner = newOwner;
    }
}
"#;
